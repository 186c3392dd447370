pub mod commands;

use std::io::{self, Write};
use uuid::Uuid;

use crate::cli::commands::{Commands, NoteAction};
use crate::client::{
    dashboard::title_from, Action, ApiClient, ClientError, Dashboard, DashboardState,
    NotificationKind, SentMessage,
};
use crate::config::AppConfig;
use crate::db::{Chat, Note};

pub async fn run_cli(command: Commands, config: &AppConfig) -> Result<(), ClientError> {
    let client = ApiClient::new(&config.client.base_url, &config.client.api_key);
    let mut dashboard = Dashboard::new(client);

    match command {
        Commands::Serve => {
            unreachable!("Serve command should be intercepted by main.rs to boot actix-web");
        }
        Commands::Notes { action } => {
            match action {
                NoteAction::List { search } => {
                    dashboard.refresh().await?;
                    if let Some(term) = search {
                        dashboard.dispatch(Action::Search(term));
                    }
                    let notes = dashboard.state().visible_notes();
                    if notes.is_empty() {
                        println!("No notes found.");
                    } else {
                        println!("{:<38} | {:<20} | Title", "ID", "Updated At");
                        println!("{:-<38}-+-{:-<20}-+-{:-<20}", "", "", "");
                        for note in notes {
                            println!(
                                "{:<38} | {:<20} | {} {}",
                                note.id.to_string(),
                                note.updated_at.format("%Y-%m-%d %H:%M"),
                                note.icon.unwrap_or_default().glyph(),
                                note.title
                            );
                        }
                    }
                }
                NoteAction::Show { id } => {
                    dashboard.refresh().await?;
                    dashboard.select_note(Some(id));
                    match dashboard.state().selected_note().cloned() {
                        Some(note) => {
                            print_note(&note);
                            let chats = dashboard.load_note_chats(id).await?;
                            print_chats(&chats);
                        }
                        None => eprintln!("Note {} not found.", id),
                    }
                }
                NoteAction::Create { title, content } => {
                    let note = dashboard.create_note(&title, &content).await?;
                    print_note(&note);
                }
                NoteAction::Delete { id } => {
                    dashboard.delete_note(id).await?;
                }
                NoteAction::Summarize { id } => {
                    let note = dashboard.regenerate_summary(id).await?;
                    print_note(&note);
                }
            }
            print_notifications(&mut dashboard);
        }
        Commands::Chat { note } => {
            run_repl(dashboard, note).await?;
        }
    }

    Ok(())
}

fn print_note(note: &Note) {
    println!("{} {}", note.icon.unwrap_or_default().glyph(), note.title);
    println!("ID: {}", note.id);
    println!("Updated At: {}", note.updated_at);
    println!("---");
    println!("{}", note.content);
    if let Some(summary) = &note.summary {
        println!("---");
        println!("Summary: {}", summary);
    }
}

fn print_chats(chats: &[Chat]) {
    if chats.is_empty() {
        return;
    }
    println!("---");
    println!("Chats:");
    for chat in chats {
        println!(
            "  {} | {} | {} messages",
            chat.updated_at.format("%Y-%m-%d %H:%M"),
            chat.title,
            chat.messages.len()
        );
    }
}

fn print_notifications(dashboard: &mut Dashboard<ApiClient>) {
    for n in &dashboard.state().notifications {
        match n.kind {
            NotificationKind::Success => println!("[ok] {}", n.text),
            NotificationKind::Error => eprintln!("[error] {}", n.text),
        }
    }
    dashboard.dispatch(Action::ClearNotifications);
}

fn print_note_list(state: &DashboardState) {
    for (i, note) in state.visible_notes().iter().enumerate() {
        let marker = if state.selected_note == Some(note.id) { '*' } else { ' ' };
        println!(
            "{}{:>3}. {} {}",
            marker,
            i + 1,
            note.icon.unwrap_or_default().glyph(),
            note.title
        );
    }
}

/// `/select` accepts a list position or a note id.
fn resolve_note(state: &DashboardState, arg: &str) -> Option<Uuid> {
    if let Ok(id) = arg.parse::<Uuid>() {
        return Some(id);
    }
    let index = arg.parse::<usize>().ok()?.checked_sub(1)?;
    state.visible_notes().get(index).map(|n| n.id)
}

async fn run_repl(mut dashboard: Dashboard<ApiClient>, note: Option<Uuid>) -> Result<(), ClientError> {
    dashboard.refresh().await?;
    if note.is_some() {
        dashboard.select_note(note);
    }

    println!("--- Thought Sort ---");
    println!("Commands: /notes, /select <n>, /chats, /clear, /new, /add, /exit");
    println!("--------------------");

    let mut last_reply: Option<String> = None;

    loop {
        let prompt = match dashboard.state().selected_note() {
            Some(note) => format!("\n[{}] You> ", title_from(&note.title)),
            None => "\nYou> ".to_string(),
        };
        print!("{}", prompt);
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).unwrap_or(0) == 0 {
            break;
        }
        let text = input.trim();

        if text.is_empty() {
            continue;
        }
        if text == "/exit" || text == "/quit" {
            break;
        }

        match text.split_once(' ').map_or((text, ""), |(c, a)| (c, a.trim())) {
            ("/notes", _) => print_note_list(dashboard.state()),
            ("/select", arg) => match resolve_note(dashboard.state(), arg) {
                Some(id) => dashboard.select_note(Some(id)),
                None => eprintln!("No such note: {}", arg),
            },
            ("/chats", _) => match dashboard.state().selected_note {
                Some(id) => {
                    if let Ok(chats) = dashboard.load_note_chats(id).await {
                        print_chats(&chats);
                    }
                }
                None => eprintln!("Select a note first."),
            },
            ("/clear", _) => dashboard.select_note(None),
            ("/new", _) => dashboard.select_chat(None),
            ("/add", _) => match &last_reply {
                Some(reply) => {
                    let reply = reply.clone();
                    let _ = dashboard.add_response_to_note(&reply).await;
                }
                None => eprintln!("Nothing to add yet."),
            },
            _ => match dashboard.send_message(text).await {
                Ok(SentMessage::NoteReply { reply, .. }) | Ok(SentMessage::GeneralReply { reply, .. }) => {
                    println!("Assistant> {}", reply);
                    last_reply = Some(reply);
                }
                Ok(SentMessage::NoteCreated(note)) => {
                    println!("Created note: {} {}", note.icon.unwrap_or_default().glyph(), note.title);
                }
                Err(ClientError::Validation(msg)) => eprintln!("{}", msg),
                Err(_) => {}
            },
        }

        print_notifications(&mut dashboard);
    }

    Ok(())
}
