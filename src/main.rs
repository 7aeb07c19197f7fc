use anyhow::Result;
use clap::Parser;
use tasklane::cli::{self, Command, TagCommand};
use tasklane::commands;

fn main() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")?.start()?;
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(Command::List { status: None });
    match command {
        Command::List { status } => commands::list(status),
        Command::Add { name, status, tags } => commands::add(name, status, tags),
        Command::Rename { task_id, name } => commands::rename(task_id, name),
        Command::Rm { task_id } => commands::rm(task_id),
        Command::Move { task_id, status } => commands::move_task(task_id, status),
        Command::Drag { task_id, status } => commands::drag(task_id, status),
        Command::Attach { task_id, tag } => commands::attach(task_id, tag),
        Command::Detach { task_id, tag } => commands::detach(task_id, tag),
        Command::Tag { command } => match command {
            TagCommand::Ls => commands::tag_ls(),
            TagCommand::Add { name } => commands::tag_add(name),
            TagCommand::Rename { tag_id, name } => commands::tag_rename(tag_id, name),
            TagCommand::Rm { tag_id } => commands::tag_rm(tag_id),
        },
    }
}
