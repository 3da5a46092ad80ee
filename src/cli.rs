use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::config::DataSource;
use crate::domain::ListKind;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "eduview",
    version,
    about = "AntechLearn admin dashboard and site client",
    long_about = "eduview manages the subscribers and contact messages of the AntechLearn site.\n\nWithout a subcommand it opens the terminal dashboard.\n\nExamples:\n  eduview\n  eduview render messages --status unread\n  eduview export --out ./exports\n  eduview subscribe jane@example.com"
)]
pub struct Cli {
    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to config file (defaults to ~/.eduview/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(long, value_name = "URL", global = true, help = "Backend base url.")]
    pub api_base: Option<String>,

    #[arg(long, value_name = "N", global = true, help = "Items per page.")]
    pub page_size: Option<usize>,

    #[arg(long, value_enum, global = true, help = "Where list data comes from.")]
    pub source: Option<DataSource>,

    #[arg(
        long = "csv",
        value_name = "FILE",
        global = true,
        help = "Subscriber CSV used with --source csv."
    )]
    pub subscribers_csv: Option<String>,

    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = "true",
        global = true,
        help = "Treat an unreachable backend as success for subscribe/contact."
    )]
    pub optimistic_offline: Option<bool>,

    #[arg(long, value_name = "SECS", global = true, help = "HTTP request timeout.")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "FILE", global = true, help = "Dashboard log file.")]
    pub log_file: Option<String>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open the terminal dashboard (default).
    Dashboard,
    /// Print one page of a list as HTML.
    Render {
        #[arg(value_enum)]
        kind: KindArg,
        #[arg(long, short = 'q', default_value = "")]
        query: String,
        #[arg(long, short = 's', help = "active|inactive for subscribers, unread|read for messages.")]
        status: Option<String>,
        #[arg(long, short = 'p', default_value_t = 1)]
        page: usize,
    },
    /// Write all subscribers to subscribers_{date}.csv.
    Export {
        #[arg(long, value_name = "DIR")]
        out: Option<String>,
    },
    /// Subscribe an email address to the newsletter.
    Subscribe { email: String },
    /// Send a message through the contact form.
    Contact {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Print the HTML preview of a newsletter.
    Preview {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        body: String,
    },
    /// Check a registration form.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Subscribers,
    Messages,
}

impl From<KindArg> for ListKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Subscribers => ListKind::Subscribers,
            KindArg::Messages => ListKind::Messages,
        }
    }
}
