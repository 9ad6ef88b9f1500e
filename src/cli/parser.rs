use crate::export::ExportFormat;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface definition for Tito
#[derive(Parser)]
#[command(
    name = "tito",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track shifts, breaks and earnings; works offline and syncs to your account",
    long_about = None
)]
pub struct Cli {
    /// Override the local database path (useful for tests or a custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the remote database path
    #[arg(global = true, long = "remote")]
    pub remote: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Subcommand)]
pub enum ClockAction {
    /// Start a shift now
    In,
    /// Finish the running shift now
    Out,
    /// Pause the running shift
    BreakStart,
    /// Resume after a break
    BreakEnd,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the databases and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Sign in to sync shifts and settings with your account
    Login {
        #[arg(long, help = "Account email")]
        email: String,
    },

    /// Sign out and clear this device's copy of the account data
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Clock in/out or take a break
    Clock {
        #[command(subcommand)]
        action: ClockAction,
    },

    /// Show the current shift status
    Status,

    /// Add a past shift by hand
    Add {
        /// Date of the shift (YYYY-MM-DD)
        date: String,

        #[arg(long = "in", help = "Clock-in time (HH:MM)")]
        start: String,

        #[arg(long = "out", help = "Clock-out time (HH:MM); earlier than --in means next day")]
        end: String,

        #[arg(long = "break", default_value_t = 0, help = "Break duration in minutes")]
        break_minutes: u32,
    },

    /// Edit an existing shift
    Edit {
        /// Shift id (see `list`)
        id: String,

        #[arg(long, help = "New date (YYYY-MM-DD)")]
        date: Option<String>,

        #[arg(long = "in", help = "New clock-in time (HH:MM)")]
        start: Option<String>,

        #[arg(long = "out", help = "New clock-out time (HH:MM)")]
        end: Option<String>,

        #[arg(long = "break", help = "New break duration in minutes")]
        break_minutes: Option<u32>,

        #[arg(long, help = "Hourly rate for this shift")]
        rate: Option<f64>,
    },

    /// Delete a shift
    Del {
        /// Shift id (see `list`)
        id: String,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// List shifts
    List {
        #[arg(
            long,
            short,
            help = "week, month, all, or YYYY / YYYY-MM / YYYY-MM-DD (ranges with A:B)"
        )]
        period: Option<String>,
    },

    /// Show or change settings
    Settings {
        #[arg(long, help = "Hourly rate")]
        rate: Option<f64>,

        #[arg(long, help = "Monthly earnings goal")]
        goal: Option<f64>,

        #[arg(long, help = "Work start time (HH:MM)")]
        start: Option<String>,

        #[arg(long, help = "Work end time (HH:MM)")]
        end: Option<String>,

        #[arg(long, value_enum, help = "Shift reminders")]
        notifications: Option<Toggle>,

        #[arg(
            long = "auto-clock-out",
            value_enum,
            help = "Clock out automatically at work end time"
        )]
        auto_clock_out: Option<Toggle>,
    },

    /// Monthly goal progress
    Summary {
        #[arg(long, help = "Month to summarize (YYYY-MM), default current month")]
        month: Option<String>,
    },

    /// Export a timesheet
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "PERIOD",
            default_value = "month",
            help = "week, month, all, or YYYY / YYYY-MM / YYYY-MM-DD (ranges with A:B)"
        )]
        period: String,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Reconcile with the remote store now
    Sync,
}
