use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::types::Priority;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Plain,
    Json,
}

#[derive(Parser)]
#[command(name = "linctl")]
#[command(about = "A command-line client for Linear", version)]
#[command(after_help = "EXAMPLES:
    linctl auth login                 Store an API key
    linctl issues --mine              List your assigned issues
    linctl issue view ENG-123         View issue details
    linctl issue create -t \"Title\"    Create a new issue
    linctl issue comment ENG-123 \"Note\"  Add a comment")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, plain, json)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage credentials
    #[command(after_help = "EXAMPLES:
    linctl auth login --key lin_api_...
    linctl auth status
    linctl auth rate-limit
    linctl auth logout")]
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Manage issues
    #[command(
        alias = "i",
        after_help = "EXAMPLES:
    linctl issue list --mine --limit 10
    linctl issue view ENG-123
    linctl issue create -t \"Bug fix\" -d \"Description\" --priority high
    linctl issue update ENG-123 --status \"In Progress\"
    linctl issue close ENG-123"
    )]
    Issue {
        #[command(subcommand)]
        action: IssueCommands,
    },
    /// List issues (alias for 'issue list')
    #[command(
        alias = "is",
        after_help = "EXAMPLES:
    linctl issues --mine
    linctl issues --team ENG --status \"In Progress\"
    linctl issues --project \"Backend\" --limit 50"
    )]
    Issues(IssueListArgs),
    /// Manage teams
    Team {
        #[command(subcommand)]
        action: TeamCommands,
    },
    /// List teams (alias for 'team list')
    #[command(alias = "t")]
    Teams,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// List users (alias for 'user list')
    Users,
    /// Manage projects
    #[command(after_help = "EXAMPLES:
    linctl project list --team ENG
    linctl project view \"Backend rewrite\"
    linctl project milestones \"Backend rewrite\"")]
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// List projects (alias for 'project list')
    #[command(alias = "p")]
    Projects {
        /// Filter by team key (e.g., ENG)
        #[arg(long)]
        team: Option<String>,
    },
    /// Manage cycles/sprints
    Cycle {
        #[command(subcommand)]
        action: CycleCommands,
    },
    /// List cycles (alias for 'cycle list')
    Cycles(CycleListArgs),
    /// Manage labels
    Label {
        #[command(subcommand)]
        action: LabelCommands,
    },
    /// List labels (alias for 'label list')
    #[command(alias = "l")]
    Labels {
        /// Filter by team key (e.g., ENG)
        #[arg(long)]
        team: Option<String>,
    },
    /// Manage documents
    #[command(alias = "doc")]
    Document {
        #[command(subcommand)]
        action: DocumentCommands,
    },
    /// List documents (alias for 'document list')
    Docs {
        /// Filter by project name
        #[arg(long)]
        project: Option<String>,
    },
    /// Manage initiatives
    Initiative {
        #[command(subcommand)]
        action: InitiativeCommands,
    },
    /// List custom views
    Views,
    /// Manage favorites
    #[command(after_help = "EXAMPLES:
    linctl favorite list
    linctl favorite remove ENG-123")]
    Favorite {
        #[command(subcommand)]
        action: FavoriteCommands,
    },
    /// List favorites (alias for 'favorite list')
    Favorites,
    /// Manage notifications
    #[command(after_help = "EXAMPLES:
    linctl notification list
    linctl notification read abc123-uuid
    linctl notification read-all")]
    Notification {
        #[command(subcommand)]
        action: NotificationCommands,
    },
    /// List unread notifications (alias for 'notification list')
    Notifications,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    linctl completions bash > ~/.bash_completion.d/linctl
    linctl completions zsh > ~/.zfunc/_linctl
    linctl completions fish > ~/.config/fish/completions/linctl.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an API key or OAuth access token
    #[command(after_help = "EXAMPLES:
    linctl auth login
    linctl auth login --key lin_api_...
    linctl auth login --token <oauth-token> --expires-in 86400")]
    Login(AuthLoginArgs),
    /// Delete stored credentials
    Logout,
    /// Show the authenticated user
    Status,
    /// Show API request and complexity quotas
    #[command(name = "rate-limit")]
    RateLimit,
}

#[derive(Args)]
pub struct AuthLoginArgs {
    /// Personal API key (sent verbatim)
    #[arg(long, conflicts_with = "token")]
    pub key: Option<String>,

    /// OAuth access token (sent with a Bearer prefix)
    #[arg(long)]
    pub token: Option<String>,

    /// Token lifetime in seconds, counted from now
    #[arg(long, requires = "token")]
    pub expires_in: Option<i64>,
}

#[derive(Subcommand)]
pub enum IssueCommands {
    /// List issues
    #[command(
        alias = "ls",
        after_help = "EXAMPLES:
    linctl issue list --mine
    linctl issue list --team ENG --status \"In Progress\"
    linctl issue list --cursor <token-from-previous-page>"
    )]
    List(IssueListArgs),
    /// View issue details
    #[command(alias = "v")]
    View {
        /// Issue identifier (e.g., ENG-123) or UUID
        id: String,
    },
    /// Create a new issue
    #[command(
        alias = "c",
        after_help = "EXAMPLES:
    linctl issue create -t \"Fix login bug\"
    linctl issue create -t \"New feature\" -d \"Description\" --priority high"
    )]
    Create(IssueCreateArgs),
    /// Update an existing issue
    #[command(alias = "u")]
    Update(IssueUpdateArgs),
    /// Close an issue (set status to the team's completed state)
    Close {
        /// Issue identifier (e.g., ENG-123) or UUID
        id: String,
    },
    /// Archive an issue
    Archive {
        /// Issue identifier (e.g., ENG-123) or UUID
        id: String,
    },
    /// Delete an issue
    Delete {
        /// Issue identifier (e.g., ENG-123) or UUID
        id: String,
    },
    /// List comments on an issue
    Comments {
        /// Issue identifier (e.g., ENG-123)
        id: String,
    },
    /// Add a comment to an issue
    #[command(after_help = "EXAMPLES:
    linctl issue comment ENG-123 \"This is a comment\"")]
    Comment(CommentArgs),
    /// List attachments on an issue
    Attachments {
        /// Issue identifier (e.g., ENG-123)
        id: String,
    },
    /// Attach a URL to an issue
    #[command(after_help = "EXAMPLES:
    linctl issue attach ENG-123 https://example.com
    linctl issue attach ENG-123 https://example.com -t \"Reference\"")]
    Attach(AttachUrlArgs),
    /// Remove an attachment from an issue by its URL
    Detach {
        /// Issue identifier (e.g., ENG-123)
        id: String,
        /// URL of the attachment to remove
        url: String,
    },
    /// Add an issue to your favorites
    Favorite {
        /// Issue identifier (e.g., ENG-123) or UUID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TeamCommands {
    /// List teams
    #[command(alias = "ls")]
    List,
    /// View team details
    View {
        /// Team key (e.g., ENG)
        key: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Show the authenticated user
    Me,
    /// List users in the workspace
    #[command(alias = "ls")]
    List,
    /// View user details
    View {
        /// User UUID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    #[command(alias = "ls")]
    List {
        /// Filter by team key (e.g., ENG)
        #[arg(long)]
        team: Option<String>,
    },
    /// View project details
    View {
        /// Project name or UUID
        id: String,
    },
    /// Create a new project
    Create(ProjectCreateArgs),
    /// Update an existing project
    Update(ProjectUpdateArgs),
    /// List milestones of a project
    Milestones {
        /// Project name or UUID
        id: String,
    },
    /// Add a milestone to a project
    #[command(name = "milestone-create")]
    AddMilestone(MilestoneCreateArgs),
}

#[derive(Args)]
pub struct ProjectCreateArgs {
    /// Project name
    #[arg(long, short)]
    pub name: String,

    /// Project description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Team key the project belongs to (uses default if not specified)
    #[arg(long)]
    pub team: Option<String>,
}

#[derive(Args)]
pub struct ProjectUpdateArgs {
    /// Project name or UUID
    pub id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New state (planned, started, paused, completed, canceled)
    #[arg(long)]
    pub state: Option<String>,

    /// New target date (YYYY-MM-DD)
    #[arg(long)]
    pub target_date: Option<String>,
}

#[derive(Args)]
pub struct MilestoneCreateArgs {
    /// Project name or UUID
    pub project: String,

    /// Milestone name
    #[arg(long, short)]
    pub name: String,

    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub target_date: Option<String>,
}

#[derive(Subcommand)]
pub enum CycleCommands {
    /// List cycles
    #[command(alias = "ls")]
    List(CycleListArgs),
    /// View cycle details
    View {
        /// Cycle UUID
        id: String,
    },
}

#[derive(Args, Clone)]
pub struct CycleListArgs {
    /// Filter by team key (e.g., ENG)
    #[arg(long)]
    pub team: Option<String>,
}

#[derive(Subcommand)]
pub enum LabelCommands {
    /// List labels
    #[command(alias = "ls")]
    List {
        /// Filter by team key (e.g., ENG)
        #[arg(long)]
        team: Option<String>,
    },
    /// Create a new label
    Create(LabelCreateArgs),
}

#[derive(Args)]
pub struct LabelCreateArgs {
    /// Label name
    #[arg(long, short)]
    pub name: String,

    /// Label color as hex (e.g., #4ea7fc)
    #[arg(long)]
    pub color: Option<String>,

    /// Team key to scope the label to (workspace label if omitted)
    #[arg(long)]
    pub team: Option<String>,
}

#[derive(Subcommand)]
pub enum DocumentCommands {
    /// List documents
    #[command(alias = "ls")]
    List {
        /// Filter by project name
        #[arg(long)]
        project: Option<String>,
    },
    /// View a document, including its content
    View {
        /// Document UUID
        id: String,
    },
    /// Create a new document
    Create(DocumentCreateArgs),
}

#[derive(Args)]
pub struct DocumentCreateArgs {
    /// Document title
    #[arg(long, short)]
    pub title: String,

    /// Document content (markdown supported)
    #[arg(long, short)]
    pub content: Option<String>,

    /// Project name or UUID to file the document under
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Subcommand)]
pub enum InitiativeCommands {
    /// List initiatives
    #[command(alias = "ls")]
    List,
    /// View initiative details
    View {
        /// Initiative UUID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum FavoriteCommands {
    /// List favorites
    #[command(alias = "ls")]
    List,
    /// Remove an issue from your favorites
    Remove {
        /// Issue identifier (e.g., ENG-123)
        issue: String,
    },
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List notifications
    #[command(alias = "ls")]
    List {
        /// Include notifications already read
        #[arg(long)]
        all: bool,
    },
    /// Mark a notification as read
    Read {
        /// Notification UUID
        id: String,
    },
    /// Mark all notifications as read
    #[command(name = "read-all")]
    ReadAll,
}

#[derive(Args, Clone)]
pub struct IssueListArgs {
    /// Show only my issues
    #[arg(long)]
    pub mine: bool,

    /// Filter by team key (e.g., ENG)
    #[arg(long)]
    pub team: Option<String>,

    /// Filter by status name
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by project name
    #[arg(long)]
    pub project: Option<String>,

    /// Filter by label name
    #[arg(long)]
    pub label: Option<String>,

    /// Maximum number of issues to show (default: 25, max: 250)
    #[arg(long, short, default_value = "25")]
    pub limit: u32,

    /// Opaque pagination cursor from a previous page
    #[arg(long)]
    pub cursor: Option<String>,
}

#[derive(Args)]
pub struct IssueCreateArgs {
    /// Issue title
    #[arg(long, short)]
    pub title: String,

    /// Issue description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Team key (uses default if not specified)
    #[arg(long)]
    pub team: Option<String>,

    /// Project name
    #[arg(long)]
    pub project: Option<String>,

    /// Priority level
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
}

#[derive(Args)]
pub struct IssueUpdateArgs {
    /// Issue identifier (e.g., ENG-123) or UUID
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New status
    #[arg(long)]
    pub status: Option<String>,

    /// New priority level
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,

    /// Assign to user (ID or "me")
    #[arg(long)]
    pub assignee: Option<String>,
}

#[derive(Args)]
pub struct AttachUrlArgs {
    /// Issue identifier (e.g., ENG-123) or UUID
    pub id: String,

    /// URL to attach
    pub url: String,

    /// Title for the attachment
    #[arg(long, short)]
    pub title: Option<String>,
}

#[derive(Args)]
pub struct CommentArgs {
    /// Issue identifier (e.g., ENG-123) or UUID
    pub id: String,

    /// Comment body (markdown supported)
    pub body: String,
}
