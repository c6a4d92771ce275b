use clap::{Parser, Subcommand};

/// A calm, offline-first herd maintenance planner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a one-off task occurrence
    Add(AddCommand),
    /// List occurrences for a day or window
    List(ListCommand),
    /// Mark an occurrence as done
    Do(DoCommand),
    /// Skip an occurrence without rescheduling
    Skip(SkipCommand),
    /// Show the action history
    History(HistoryCommand),
    /// Project template occurrences over the planning horizon
    Plan(PlanCommand),
    /// Manage maintenance templates
    Template(TemplateCommand),
    /// Manage the herd registry
    Cow(CowCommand),
    /// Log one day of behaviour signals for a cow
    Log(LogCommand),
    /// Behaviour-based risk insights for the herd
    Insights(InsightsCommand),
    /// Weekly money report and optimization summary
    Report(ReportCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the occurrence
    pub title: String,
    /// The due date (e.g., 'today', 'next friday', '2025-09-01')
    #[clap(short, long)]
    pub due: Option<String>,
    /// Time of day (e.g., '06:30', '2:30 PM', 'noon')
    #[clap(long)]
    pub time: Option<String>,
    /// Category label (equipment, health, hygiene, ...)
    #[clap(short, long)]
    pub category: Option<String>,
    /// Who the task is assigned to
    #[clap(short, long)]
    pub assigned: Option<String>,
    /// Repeat every N units after completion
    #[clap(long)]
    pub every: Option<u32>,
    /// Recurrence unit (days, weeks, months)
    #[clap(long, requires = "every")]
    pub unit: Option<String>,
    /// Anchor the next occurrence on the due date instead of completion day
    #[clap(long, requires = "every")]
    pub anchor_due_date: bool,
    /// Free-form notes
    #[clap(long)]
    pub notes: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Show a single day (e.g., 'today', 'next monday')
    #[clap(long, conflicts_with_all = ["days", "overdue"])]
    pub on: Option<String>,
    /// Show the next N days of pending work
    #[clap(long, default_value = "7")]
    pub days: u32,
    /// Show only overdue pending occurrences
    #[clap(long)]
    pub overdue: bool,
    /// Filter by category
    #[clap(short, long)]
    pub category: Option<String>,
    /// Filter by status (pending, done, skipped)
    #[clap(short, long, conflicts_with = "all")]
    pub status: Option<String>,
    /// Include done and skipped occurrences
    #[clap(short, long)]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID (or unique prefix) of the occurrence to complete
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SkipCommand {
    /// The ID (or unique prefix) of the occurrence to skip
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct HistoryCommand {
    /// Maximum number of entries to show
    #[clap(short, long, default_value = "20")]
    pub limit: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct PlanCommand {
    /// Override the projection horizon in days
    #[clap(long)]
    pub days: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct TemplateCommand {
    #[command(subcommand)]
    pub command: TemplateSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TemplateSubcommand {
    /// Add a maintenance template
    Add(AddTemplateCommand),
    /// List templates
    List,
    /// Remove a template and its pending occurrences
    Remove(RemoveTemplateCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddTemplateCommand {
    /// The template title
    pub title: String,
    /// Repeat every N units
    #[clap(long, default_value = "1")]
    pub every: u32,
    /// Recurrence unit (days, weeks, months)
    #[clap(long, default_value = "days")]
    pub unit: String,
    /// First due date (e.g., 'today', '2025-09-01')
    #[clap(long)]
    pub start: Option<String>,
    /// Default time of day
    #[clap(long)]
    pub time: Option<String>,
    /// Category label
    #[clap(short, long)]
    pub category: Option<String>,
    /// Who the template's occurrences are assigned to
    #[clap(short, long)]
    pub assigned: Option<String>,
    /// Free-form notes
    #[clap(long)]
    pub notes: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RemoveTemplateCommand {
    /// The template ID (or unique prefix)
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CowCommand {
    #[command(subcommand)]
    pub command: CowSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CowSubcommand {
    /// Register a cow
    Add(AddCowCommand),
    /// List the herd
    List(ListCowCommand),
    /// Archive a cow (kept in records, hidden from planning)
    Archive(CowIdCommand),
    /// Restore an archived cow
    Restore(CowIdCommand),
    /// Remove a cow permanently
    Remove(RemoveCowCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCowCommand {
    /// Ear tag (unique, e.g., 'DE-0342')
    pub ear_tag: String,
    /// Display name
    #[clap(long)]
    pub name: Option<String>,
    /// Sex (female, male)
    #[clap(long, default_value = "female")]
    pub sex: String,
    /// Production type (dairy, beef)
    #[clap(long, default_value = "dairy")]
    pub production: String,
    /// Date of birth (e.g., '2021-03-15')
    #[clap(long)]
    pub born: Option<String>,
    /// Pregnancy due date, if known
    #[clap(long)]
    pub due_date: Option<String>,
    /// Weight in kilograms
    #[clap(long)]
    pub weight: Option<f64>,
    /// Also schedule the recurring vaccination booster for this cow
    #[clap(long)]
    pub vaccines: bool,
    /// Free-form notes
    #[clap(long)]
    pub notes: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCowCommand {
    /// Include archived cows
    #[clap(short, long)]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CowIdCommand {
    /// The cow's ear tag or ID
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RemoveCowCommand {
    /// The cow's ear tag or ID
    pub id: String,
    /// Remove without confirmation
    #[clap(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct LogCommand {
    /// The cow's ear tag
    pub ear_tag: String,
    /// Day the signals belong to (defaults to today)
    #[clap(long)]
    pub date: Option<String>,
    /// Minutes spent at the feed trough
    #[clap(long)]
    pub trough_minutes: Option<f64>,
    /// Number of distinct meals
    #[clap(long)]
    pub meals: Option<f64>,
    /// Average meal length in minutes
    #[clap(long)]
    pub avg_meal_minutes: Option<f64>,
    /// Manually weighed feed intake, kg
    #[clap(long)]
    pub feed_kg: Option<f64>,
    /// Activity index (0 to 2)
    #[clap(long)]
    pub activity: Option<f64>,
    /// Minutes spent alone
    #[clap(long)]
    pub alone_minutes: Option<f64>,
    /// Number of water trough visits
    #[clap(long)]
    pub water_visits: Option<f64>,
    /// Minutes spent at the water trough
    #[clap(long)]
    pub water_minutes: Option<f64>,
    /// Minutes spent lying down
    #[clap(long)]
    pub lying_minutes: Option<f64>,
    /// Ambient temperature, Celsius
    #[clap(long)]
    pub temp: Option<f64>,
    /// Relative humidity, percent
    #[clap(long)]
    pub humidity: Option<f64>,
    /// Milk yield, liters
    #[clap(long)]
    pub milk: Option<f64>,
    /// Meal start times (repeatable, e.g., --meal-at 06:30 --meal-at 17:00)
    #[clap(long = "meal-at")]
    pub meal_at: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct InsightsCommand {
    /// Limit to one cow's ear tag
    pub ear_tag: Option<String>,
    /// Day to score (defaults to the latest logged day per cow)
    #[clap(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ReportCommand {
    /// Show the per-cow feed economics table as well
    #[clap(long)]
    pub feed: bool,
}
