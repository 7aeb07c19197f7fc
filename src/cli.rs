use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tasklane", version, about = "Three-lane task board with tags")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks on the board
    List {
        /// Show a single lane (todo, doing, done)
        #[arg(long)]
        status: Option<String>,
    },
    /// Add a new task
    Add {
        /// Name of the task
        name: String,
        /// Lane to place the task in (defaults to todo)
        #[arg(long)]
        status: Option<String>,
        /// Tags to attach, by id or name (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },
    /// Rename an existing task
    Rename {
        /// Task id to rename
        task_id: String,
        /// New name
        name: String,
    },
    /// Remove a task
    Rm {
        /// Task id to remove
        task_id: String,
    },
    /// Move a task to another lane
    Move {
        /// Task id to move
        task_id: String,
        /// Destination lane (todo, doing, done)
        status: String,
    },
    /// Move a task through the drag gesture (ends up last in the lane)
    Drag {
        /// Task id to drag
        task_id: String,
        /// Lane to drop on (todo, doing, done)
        status: String,
    },
    /// Attach a tag to a task
    Attach {
        /// Task id
        task_id: String,
        /// Tag id or name
        tag: String,
    },
    /// Detach a tag from a task
    Detach {
        /// Task id
        task_id: String,
        /// Tag id or name
        tag: String,
    },
    /// Manage the tag registry
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// List all tags
    Ls,
    /// Create a tag
    Add {
        /// Tag name
        name: String,
    },
    /// Rename a tag
    Rename {
        /// Tag id
        tag_id: String,
        /// New name
        name: String,
    },
    /// Delete a tag (tasks keep their references)
    Rm {
        /// Tag id
        tag_id: String,
    },
}
