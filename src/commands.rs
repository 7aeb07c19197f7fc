use crate::model::{TagId, TaskStatus, STATUSES};
use crate::popup::PopupSession;
use crate::storage::{select_store, PersistenceBridge};
use anyhow::{anyhow, bail, Result};

pub fn list(status: Option<String>) -> Result<()> {
    let (session, _bridge) = open_session();
    let filter = status.map(|s| parse_status(&s)).transpose()?;
    for lane in STATUSES {
        if let Some(only) = filter {
            if lane != only {
                continue;
            }
        }
        println!("{}", lane.label());
        let tasks = session.board.state().list(lane);
        if tasks.is_empty() {
            println!("  (empty)");
        }
        for task in tasks {
            let tag_names: Vec<&str> = task
                .tag_ids
                .iter()
                .filter_map(|id| session.tags.lookup(id))
                .map(|tag| tag.name.as_str())
                .collect();
            if tag_names.is_empty() {
                println!("  - {}: {}", task.id, task.name);
            } else {
                println!("  - {}: {} [{}]", task.id, task.name, tag_names.join(", "));
            }
        }
        println!();
    }
    Ok(())
}

pub fn add(name: String, status: Option<String>, tags: Vec<String>) -> Result<()> {
    let (mut session, bridge) = open_session();
    let status = status
        .map(|s| parse_status(&s))
        .transpose()?
        .unwrap_or(TaskStatus::Todo);
    let id = session.board.add_task(status);
    session.board.commit_task_name(status, &id, &name);
    for tag in tags {
        let tag_id = resolve_tag(&session, &tag)?;
        session.board.attach_tag(status, &id, &tag_id);
    }
    bridge.flush();
    println!("Added task {} to {}", id, status);
    Ok(())
}

pub fn rename(task_id: String, name: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    let status = locate(&session, &task_id)?;
    session.board.begin_edit(status, &task_id);
    session.board.commit_task_name(status, &task_id, &name);
    bridge.flush();
    println!("Renamed task {}", task_id);
    Ok(())
}

pub fn rm(task_id: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    let status = locate(&session, &task_id)?;
    session.board.remove_task(status, &task_id);
    bridge.flush();
    println!("Removed task {}", task_id);
    Ok(())
}

pub fn move_task(task_id: String, status: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    let to = parse_status(&status)?;
    let from = locate(&session, &task_id)?;
    session.board.move_task(from, to, &task_id);
    bridge.flush();
    println!("Moved task {} to {}", task_id, to);
    Ok(())
}

pub fn drag(task_id: String, status: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    let to = parse_status(&status)?;
    let from = locate(&session, &task_id)?;
    session.drag_task(from, to, &task_id);
    bridge.flush();
    println!("Dragged task {} onto {}", task_id, to);
    Ok(())
}

pub fn attach(task_id: String, tag: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    let status = locate(&session, &task_id)?;
    let tag_id = resolve_tag(&session, &tag)?;
    session.board.attach_tag(status, &task_id, &tag_id);
    bridge.flush();
    println!("Attached {} to {}", tag_id, task_id);
    Ok(())
}

pub fn detach(task_id: String, tag: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    let status = locate(&session, &task_id)?;
    let tag_id = resolve_tag(&session, &tag)?;
    session.board.detach_tag(status, &task_id, &tag_id);
    bridge.flush();
    println!("Detached {} from {}", tag_id, task_id);
    Ok(())
}

pub fn tag_ls() -> Result<()> {
    let (session, _bridge) = open_session();
    if session.tags.list().is_empty() {
        println!("(no tags)");
    }
    for tag in session.tags.list() {
        println!("{}: {}", tag.id, tag.name);
    }
    Ok(())
}

pub fn tag_add(name: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    let Some(id) = session.tags.create(&name) else {
        bail!("tag name must not be empty");
    };
    bridge.flush();
    println!("Added tag {}", id);
    Ok(())
}

pub fn tag_rename(tag_id: String, name: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    if session.tags.lookup(&tag_id).is_none() {
        bail!("tag {} not found", tag_id);
    }
    session.tags.rename(&tag_id, &name);
    bridge.flush();
    println!("Renamed tag {}", tag_id);
    Ok(())
}

pub fn tag_rm(tag_id: String) -> Result<()> {
    let (mut session, bridge) = open_session();
    if session.tags.lookup(&tag_id).is_none() {
        bail!("tag {} not found", tag_id);
    }
    session.tags.remove(&tag_id);
    bridge.flush();
    println!("Removed tag {}", tag_id);
    Ok(())
}

fn open_session() -> (PopupSession, PersistenceBridge) {
    let bridge = PersistenceBridge::new(select_store());
    (PopupSession::open(bridge.clone()), bridge)
}

fn parse_status(input: &str) -> Result<TaskStatus> {
    match input.trim().to_lowercase().as_str() {
        "todo" => Ok(TaskStatus::Todo),
        "doing" => Ok(TaskStatus::Doing),
        "done" => Ok(TaskStatus::Done),
        other => Err(anyhow!("unknown lane (use todo, doing, done): {}", other)),
    }
}

fn locate(session: &PopupSession, task_id: &str) -> Result<TaskStatus> {
    session
        .board
        .locate(task_id)
        .ok_or_else(|| anyhow!("task {} not found", task_id))
}

fn resolve_tag(session: &PopupSession, tag: &str) -> Result<TagId> {
    if let Some(found) = session.tags.lookup(tag) {
        return Ok(found.id.clone());
    }
    session
        .tags
        .list()
        .iter()
        .find(|t| t.name == tag)
        .map(|t| t.id.clone())
        .ok_or_else(|| anyhow!("tag {} not found", tag))
}
