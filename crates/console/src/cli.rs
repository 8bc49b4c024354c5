#![forbid(unsafe_code)]

use clap::{Args, Parser, Subcommand};

/// Manage branches, buildings, floors and spaces through the facilities REST service.
#[derive(Debug, Parser)]
#[command(name = "fm_console", version, about)]
pub struct Cli {
    /// Base URL of the REST service.
    #[arg(long, global = true, env = "FM_API_BASE")]
    pub api: Option<String>,

    /// Connect/read timeout for each request, in milliseconds.
    #[arg(long, global = true, env = "FM_HTTP_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Branch records.
    #[command(subcommand)]
    Branches(BranchCommand),
    /// Buildings and the branch each belongs to.
    #[command(subcommand)]
    Buildings(BuildingCommand),
    /// Floors inside buildings.
    #[command(subcommand)]
    Floors(FloorCommand),
    /// Spaces on floors.
    #[command(subcommand)]
    Spaces(SpaceCommand),
    /// Counts per collection and the distinct values used by the filters.
    Overview,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Subcommand)]
pub enum BranchCommand {
    List {
        #[arg(long, default_value = "")]
        name: String,
    },
    Add(BranchFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: BranchEdit,
    },
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct BranchFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub manager: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub country: String,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub inactive: bool,
    #[arg(long)]
    pub no_ground_maintenance: bool,
}

#[derive(Debug, Args)]
pub struct BranchEdit {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub manager: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long)]
    pub ground_maintenance: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum BuildingCommand {
    List {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long = "type", default_value = "")]
        building_type: String,
    },
    Add(BuildingFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: BuildingEdit,
    },
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct BuildingFields {
    /// Branch name or id.
    #[arg(long)]
    pub branch: String,
    #[arg(long)]
    pub name: String,
    #[arg(long = "type")]
    pub building_type: String,
    #[arg(long)]
    pub floors: u32,
    #[arg(long)]
    pub address: String,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Debug, Args)]
pub struct BuildingEdit {
    /// Branch name or id.
    #[arg(long)]
    pub branch: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type")]
    pub building_type: Option<String>,
    #[arg(long)]
    pub floors: Option<u32>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum FloorCommand {
    List {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        building: String,
    },
    Add(FloorFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: FloorEdit,
    },
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct FloorFields {
    /// Building name or id.
    #[arg(long)]
    pub building: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, allow_hyphen_values = true)]
    pub number: i64,
    /// Total area in square feet.
    #[arg(long)]
    pub area: f64,
    /// Floor plan as a `data:` URI.
    #[arg(long)]
    pub plan: Option<String>,
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Debug, Args)]
pub struct FloorEdit {
    #[arg(long)]
    pub building: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub number: Option<i64>,
    #[arg(long)]
    pub area: Option<f64>,
    #[arg(long)]
    pub plan: Option<String>,
    /// Drop the stored floor plan.
    #[arg(long, conflicts_with = "plan")]
    pub clear_plan: bool,
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum SpaceCommand {
    List {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        manager: String,
    },
    Add(SpaceFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: SpaceEdit,
    },
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct SpaceFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub branch: String,
    #[arg(long)]
    pub building: String,
    #[arg(long)]
    pub floor: String,
    #[arg(long)]
    pub area: String,
    #[arg(long = "type")]
    pub meta_type: String,
    /// Name of an existing space to nest under.
    #[arg(long)]
    pub parent: Option<String>,
    #[arg(long, default_value = "")]
    pub condition: String,
    #[arg(long, default_value = "")]
    pub manager: String,
    /// Picture of the space as a `data:` URI.
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Debug, Args)]
pub struct SpaceEdit {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub branch: Option<String>,
    #[arg(long)]
    pub building: Option<String>,
    #[arg(long)]
    pub floor: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long = "type")]
    pub meta_type: Option<String>,
    #[arg(long)]
    pub parent: Option<String>,
    /// Move the space back to the top level.
    #[arg(long, conflicts_with = "parent")]
    pub no_parent: bool,
    #[arg(long)]
    pub condition: Option<String>,
    #[arg(long)]
    pub manager: Option<String>,
    /// Picture of the space as a `data:` URI.
    #[arg(long)]
    pub image: Option<String>,
}
