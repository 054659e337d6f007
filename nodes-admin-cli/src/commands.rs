//! Command implementations

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Args;
use clap::ValueEnum;
use nodes_admin_lib::console::attestations_table;
use nodes_admin_lib::console::communities_table;
use nodes_admin_lib::console::community_attestations_table;
use nodes_admin_lib::console::metric_cards;
use nodes_admin_lib::console::users_table;
use nodes_admin_lib::console::AdminConsole;
use nodes_admin_lib::error::Error;
use nodes_admin_lib::model::MemberRole;
use nodes_admin_lib::model::ProfileSummary;
use nodes_admin_lib::proxy::ReportProxy;
use nodes_admin_lib::proxy::DOWNLOAD_PATH;
use nodes_admin_lib::query::QueryHandle;
use nodes_admin_lib::table::CellValue;
use nodes_admin_lib::table::Column;
use nodes_admin_lib::table::DataTable;
use nodes_admin_lib::table::Direction;
use nodes_admin_lib::table::FilterValue;
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::render;

/// Filtering, sorting and column flags shared by the table commands.
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// Keep rows whose name contains this text (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,

    /// Sort by a column; repeat for secondary keys
    #[arg(long = "sort", value_name = "COLUMN[:asc|desc]")]
    pub sort: Vec<String>,

    /// Hide a column; repeatable
    #[arg(long = "hide", value_name = "COLUMN")]
    pub hide: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UsersArgs {
    /// Keep only users with these roles
    #[arg(long = "role", value_enum)]
    pub roles: Vec<RoleArg>,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AttestationArgs {
    /// Show the attestations of one community instead of the catalogue
    #[arg(long)]
    pub community: Option<i64>,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleArg {
    Admin,
    #[default]
    Member,
}

impl From<RoleArg> for MemberRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => MemberRole::Admin,
            RoleArg::Member => MemberRole::Member,
        }
    }
}

impl RoleArg {
    /// Facet value of the users table's `isAdmin` column.
    fn facet(self) -> &'static str {
        match self {
            RoleArg::Admin => "true",
            RoleArg::Member => "false",
        }
    }
}

// =============================================================================
// Table plumbing
// =============================================================================

/// Parses `COLUMN` or `COLUMN:asc|desc`.
pub fn parse_sort(spec: &str) -> Result<(String, Direction), CliError> {
    let (column, direction) = match spec.split_once(':') {
        Some((column, "asc")) => (column, Direction::Asc),
        Some((column, "desc")) => (column, Direction::Desc),
        Some((_, other)) => {
            return Err(CliError::InvalidArgument(format!(
                "sort direction must be 'asc' or 'desc', got '{}'",
                other
            )));
        }
        None => (spec, Direction::Asc),
    };
    if column.is_empty() {
        return Err(CliError::InvalidArgument("empty sort column".to_string()));
    }
    Ok((column.to_string(), direction))
}

/// Applies the shared flags to a table.
pub fn apply_table_args<R>(table: &mut DataTable<R>, args: &TableArgs) -> Result<(), CliError> {
    if let Some(name) = &args.name {
        table.set_filter("name", FilterValue::text(name.as_str()));
    }
    for spec in &args.sort {
        let (column, direction) = parse_sort(spec)?;
        if !table.set_sort(&column, direction) {
            return Err(CliError::InvalidArgument(format!(
                "cannot sort by '{}'",
                column
            )));
        }
    }
    for column in &args.hide {
        if table.column(column).is_none() {
            return Err(CliError::InvalidArgument(format!("unknown column '{}'", column)));
        }
        if !table.set_column_visibility(column, false) {
            log::info!("column '{}' stays visible", column);
        }
    }
    Ok(())
}

/// Waits for a mounted query and returns its data.
///
/// Data kept from an earlier fetch is still returned when a refetch failed.
async fn settle<T: Send + Sync + 'static>(mut handle: QueryHandle<T>) -> Result<Arc<T>, CliError> {
    let state = handle.settled().await;
    match (state.data, state.error) {
        (Some(data), None) => Ok(data),
        (Some(data), Some(err)) => {
            log::warn!("{}: serving cached data after error: {}", handle.key(), err);
            Ok(data)
        }
        (None, Some(err)) => Err(CliError::Query(err)),
        (None, None) => Err(CliError::Query(Arc::new(Error::NoData(handle.key().cache_key())))),
    }
}

// =============================================================================
// Reads
// =============================================================================

pub async fn dashboard(console: &AdminConsole) -> Result<(), CliError> {
    let analytics = settle(console.analytics()).await?;
    match analytics.as_ref() {
        Some(analytics) => print!("{}", render::cards(&metric_cards(analytics))),
        None => println!("No analytics available yet."),
    }
    Ok(())
}

pub async fn users(console: &AdminConsole, args: &UsersArgs) -> Result<(), CliError> {
    let page = settle(console.users()).await?;
    let mut table = users_table(page.data.clone());
    if !args.roles.is_empty() {
        table.set_filter(
            "isAdmin",
            FilterValue::facets(args.roles.iter().map(|r| r.facet())),
        );
    }
    apply_table_args(&mut table, &args.table)?;
    print!("{}", render::table(&table));
    if page.count > page.data.len() as u64 {
        println!("(first page of {} users)", page.count);
    }
    Ok(())
}

pub async fn communities(console: &AdminConsole, args: &TableArgs) -> Result<(), CliError> {
    let rows = settle(console.communities()).await?;
    let mut table = communities_table(Arc::unwrap_or_clone(rows));
    apply_table_args(&mut table, args)?;
    print!("{}", render::table(&table));
    Ok(())
}

pub async fn attestations(console: &AdminConsole, args: &AttestationArgs) -> Result<(), CliError> {
    match args.community {
        Some(community_id) => {
            let rows = settle(console.community_attestations(community_id)).await?;
            let mut table = community_attestations_table(Arc::unwrap_or_clone(rows));
            apply_table_args(&mut table, &args.table)?;
            print!("{}", render::table(&table));
        }
        None => {
            let rows = settle(console.attestations()).await?;
            let mut table = attestations_table(Arc::unwrap_or_clone(rows));
            apply_table_args(&mut table, &args.table)?;
            print!("{}", render::table(&table));
        }
    }
    Ok(())
}

fn profile_columns() -> Vec<Column<ProfileSummary>> {
    vec![
        Column::new("id", "ID", |p: &ProfileSummary| p.id.into()),
        Column::new("name", "Name", |p: &ProfileSummary| p.name.as_str().into()),
        Column::new("orcid", "ORCID", |p: &ProfileSummary| p.orcid.as_deref().into()),
        Column::new("organisations", "Organisations", |p: &ProfileSummary| {
            CellValue::Text(p.organisations.join(", "))
        }),
    ]
}

pub async fn search(console: &AdminConsole, name: Option<&str>) -> Result<(), CliError> {
    let rows = settle(console.search_profiles(name)).await?;
    let table = DataTable::new(profile_columns(), Arc::unwrap_or_clone(rows));
    print!("{}", render::table(&table));
    Ok(())
}

pub async fn check_auth(console: &AdminConsole) -> Result<(), CliError> {
    if *settle(console.auth()).await? {
        println!("Session accepted by {}", console.client().base_url());
        Ok(())
    } else {
        Err(CliError::SessionRejected)
    }
}

// =============================================================================
// Writes
// =============================================================================

pub async fn toggle_role(console: &AdminConsole, user_id: i64) -> Result<(), CliError> {
    console.toggle_user_role(user_id).await?;
    println!("Toggled admin role of user {}", user_id);
    Ok(())
}

pub async fn add_member(
    console: &AdminConsole,
    community_id: i64,
    user_id: i64,
    role: RoleArg,
) -> Result<(), CliError> {
    let created = console
        .add_member(community_id, user_id, role.into())
        .await?;
    log::debug!("add member answer: {}", created);
    println!(
        "Added user {} to community {} as {}",
        user_id,
        community_id,
        MemberRole::from(role)
    );
    Ok(())
}

pub async fn remove_member(console: &AdminConsole, community_id: i64, member_id: i64) -> Result<(), CliError> {
    console.remove_member(community_id, member_id).await?;
    println!("Removed member {} from community {}", member_id, community_id);
    Ok(())
}

pub async fn add_entry_attestation(
    console: &AdminConsole,
    community_id: i64,
    attestation_id: i64,
) -> Result<(), CliError> {
    console
        .add_entry_attestation(community_id, attestation_id)
        .await?;
    println!("Attestation {} is now an entry requirement of community {}", attestation_id, community_id);
    Ok(())
}

pub async fn remove_entry_attestation(
    console: &AdminConsole,
    community_id: i64,
    attestation_id: i64,
) -> Result<(), CliError> {
    console
        .remove_entry_attestation(community_id, attestation_id)
        .await?;
    println!("Removed entry attestation {} from community {}", attestation_id, community_id);
    Ok(())
}

pub async fn toggle_entry_attestation(
    console: &AdminConsole,
    community_id: i64,
    entry_id: i64,
) -> Result<(), CliError> {
    console
        .toggle_entry_attestation_requirement(community_id, entry_id)
        .await?;
    println!("Toggled requirement of entry attestation {} in community {}", entry_id, community_id);
    Ok(())
}

// =============================================================================
// Report
// =============================================================================

pub async fn report(console: &AdminConsole, output: &Path) -> Result<(), CliError> {
    let written = console.client().save_report(output).await?;
    println!("Saved {} bytes to {}", written, output.display());
    Ok(())
}

/// Serves the report proxy until Ctrl-C.
pub async fn serve_report(console: &AdminConsole, addr: SocketAddr) -> Result<(), CliError> {
    let proxy = ReportProxy::bind(console.client().clone(), addr).await?;
    println!("Serving http://{}{} (Ctrl-C to stop)", proxy.local_addr()?, DOWNLOAD_PATH);

    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    proxy.serve(cancel).await?;
    Ok(())
}
