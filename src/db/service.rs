use crate::db::models::{Chat, Message, MessageRole, Note, NoteRef};
use crate::icons::IconKind;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use duckdb::{params, params_from_iter, types::Type, Connection, Error as DbError, Result as DbResult, Row};
use uuid::Uuid;

const NOTE_COLUMNS: &str = "id, user_id, title, content, summary, icon, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, chat_id, role, content, created_at";
const CHAT_SELECT: &str = "SELECT c.id, c.user_id, c.title, c.note_id, c.created_at, c.updated_at, n.title
     FROM chats c
     LEFT JOIN notes n ON n.id = c.note_id AND n.user_id = c.user_id";

/// Storage operations. Note and chat operations are always scoped by the
/// owning user; message operations expect the caller to have checked the
/// parent chat's owner.
pub struct DbService;

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision it is stored with.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn conversion_error(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> DbError {
    DbError::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_uuid(row: &Row, idx: usize) -> DbResult<Uuid> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

fn get_timestamp(row: &Row, idx: usize) -> DbResult<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// Runs `f` between BEGIN and COMMIT, rolling back if it fails.
fn in_transaction<T>(conn: &Connection, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
    conn.execute("BEGIN TRANSACTION", [])?;
    match f(conn) {
        Ok(value) => {
            conn.execute("COMMIT", [])?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(e)
        }
    }
}

impl DbService {
    fn row_to_note(row: &Row) -> DbResult<Note> {
        let icon: Option<String> = row.get(5)?;
        Ok(Note {
            id: get_uuid(row, 0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            summary: row.get(4)?,
            icon: icon.map(|key| IconKind::from_key(&key)),
            created_at: get_timestamp(row, 6)?,
            updated_at: get_timestamp(row, 7)?,
        })
    }

    fn row_to_chat(row: &Row) -> DbResult<Chat> {
        let note_id: Option<String> = row.get(3)?;
        let note_id = note_id
            .map(|id| id.parse::<Uuid>().map_err(|e| conversion_error(3, e)))
            .transpose()?;
        let note_title: Option<String> = row.get(6)?;

        Ok(Chat {
            id: get_uuid(row, 0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            note_id,
            created_at: get_timestamp(row, 4)?,
            updated_at: get_timestamp(row, 5)?,
            messages: Vec::new(),
            note: note_id.zip(note_title).map(|(id, title)| NoteRef { id, title }),
        })
    }

    fn row_to_message(row: &Row) -> DbResult<Message> {
        let role: String = row.get(2)?;
        let role = MessageRole::parse(&role).ok_or_else(|| {
            conversion_error(2, std::io::Error::new(std::io::ErrorKind::InvalidData, format!("unknown role {role}")))
        })?;

        Ok(Message {
            id: row.get(0)?,
            chat_id: get_uuid(row, 1)?,
            role,
            content: row.get(3)?,
            created_at: get_timestamp(row, 4)?,
        })
    }

    // --- Note Operations ---

    pub fn insert_note(
        conn: &Connection,
        user_id: &str,
        title: &str,
        content: &str,
        summary: Option<&str>,
        icon: Option<IconKind>,
    ) -> DbResult<Note> {
        let now = now();
        let note = Note {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            summary: summary.map(str::to_string),
            icon,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            &format!("INSERT INTO notes ({NOTE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                note.id.to_string(),
                note.user_id,
                note.title,
                note.content,
                note.summary,
                note.icon.map(|i| i.name()),
                timestamp(now),
                timestamp(now)
            ],
        )?;

        Ok(note)
    }

    pub fn get_note(conn: &Connection, user_id: &str, id: Uuid) -> DbResult<Option<Note>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND user_id = ?"
        ))?;
        let mut rows = stmt.query_map(params![id.to_string(), user_id], Self::row_to_note)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Most recently updated first.
    pub fn list_notes(conn: &Connection, user_id: &str) -> DbResult<Vec<Note>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? ORDER BY updated_at DESC"
        ))?;
        let rows = stmt.query_map(params![user_id], Self::row_to_note)?;
        rows.collect()
    }

    /// Overwrites title, content and summary. The icon is left as it was.
    pub fn update_note(
        conn: &Connection,
        user_id: &str,
        id: Uuid,
        title: &str,
        content: &str,
        summary: Option<&str>,
    ) -> DbResult<Option<Note>> {
        let changed = conn.execute(
            "UPDATE notes SET title = ?, content = ?, summary = ?, updated_at = ? WHERE id = ? AND user_id = ?",
            params![title, content, summary, timestamp(now()), id.to_string(), user_id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_note(conn, user_id, id)
    }

    pub fn set_note_summary(
        conn: &Connection,
        user_id: &str,
        id: Uuid,
        summary: &str,
    ) -> DbResult<Option<Note>> {
        let changed = conn.execute(
            "UPDATE notes SET summary = ?, updated_at = ? WHERE id = ? AND user_id = ?",
            params![summary, timestamp(now()), id.to_string(), user_id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_note(conn, user_id, id)
    }

    /// Hard delete. Chats anchored to the note are kept but detached.
    /// Returns `false` when the note does not exist for this user.
    pub fn delete_note(conn: &Connection, user_id: &str, id: Uuid) -> DbResult<bool> {
        let id_str = id.to_string();
        in_transaction(conn, |conn| {
            let deleted = conn.execute(
                "DELETE FROM notes WHERE id = ? AND user_id = ?",
                params![id_str, user_id],
            )?;
            if deleted > 0 {
                conn.execute(
                    "UPDATE chats SET note_id = NULL WHERE note_id = ? AND user_id = ?",
                    params![id_str, user_id],
                )?;
            }
            Ok(deleted > 0)
        })
    }

    // --- Chat Operations ---

    pub fn insert_chat(
        conn: &Connection,
        user_id: &str,
        title: &str,
        note_id: Option<Uuid>,
    ) -> DbResult<Chat> {
        let id = Uuid::new_v4();
        let now = timestamp(now());

        conn.execute(
            "INSERT INTO chats (id, user_id, title, note_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id.to_string(),
                user_id,
                title,
                note_id.map(|n| n.to_string()),
                now,
                now
            ],
        )?;

        Self::get_chat(conn, user_id, id)?.ok_or(DbError::QueryReturnedNoRows)
    }

    /// The chat with its messages, if it belongs to `user_id`.
    pub fn get_chat(conn: &Connection, user_id: &str, id: Uuid) -> DbResult<Option<Chat>> {
        let chat = {
            let mut stmt = conn.prepare(&format!("{CHAT_SELECT} WHERE c.id = ? AND c.user_id = ?"))?;
            let mut rows = stmt.query_map(params![id.to_string(), user_id], Self::row_to_chat)?;
            rows.next().transpose()?
        };

        let Some(mut chat) = chat else {
            return Ok(None);
        };
        chat.messages = Self::get_messages(conn, chat.id)?;
        Ok(Some(chat))
    }

    /// Most recently updated first, optionally only chats anchored to `note_id`.
    pub fn list_chats(conn: &Connection, user_id: &str, note_id: Option<Uuid>) -> DbResult<Vec<Chat>> {
        let mut sql = format!("{CHAT_SELECT} WHERE c.user_id = ?");
        let mut args = vec![user_id.to_string()];
        if let Some(note_id) = note_id {
            sql.push_str(" AND c.note_id = ?");
            args.push(note_id.to_string());
        }
        sql.push_str(" ORDER BY c.updated_at DESC");

        let mut chats = {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(args), Self::row_to_chat)?;
            rows.collect::<DbResult<Vec<Chat>>>()?
        };

        for chat in chats.iter_mut() {
            chat.messages = Self::get_messages(conn, chat.id)?;
        }
        Ok(chats)
    }

    pub fn touch_chat(conn: &Connection, id: Uuid) -> DbResult<()> {
        conn.execute(
            "UPDATE chats SET updated_at = ? WHERE id = ?",
            params![timestamp(now()), id.to_string()],
        )?;
        Ok(())
    }

    /// Deletes the chat and its messages in one transaction.
    pub fn delete_chat(conn: &Connection, user_id: &str, id: Uuid) -> DbResult<bool> {
        let id_str = id.to_string();
        in_transaction(conn, |conn| {
            let deleted = conn.execute(
                "DELETE FROM chats WHERE id = ? AND user_id = ?",
                params![id_str, user_id],
            )?;
            if deleted > 0 {
                conn.execute("DELETE FROM messages WHERE chat_id = ?", params![id_str])?;
            }
            Ok(deleted > 0)
        })
    }

    // --- Message Operations ---

    fn insert_message_row(
        conn: &Connection,
        chat_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> DbResult<Message> {
        let id: i64 = conn.query_row("SELECT nextval('seq_messages_id')", [], |row| row.get(0))?;
        let message = Message {
            id,
            chat_id,
            role,
            content: content.to_string(),
            created_at: now(),
        };

        conn.execute(
            &format!("INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?, ?, ?, ?, ?)"),
            params![
                message.id,
                chat_id.to_string(),
                role.as_str(),
                message.content,
                timestamp(message.created_at)
            ],
        )?;

        Ok(message)
    }

    /// Appends one message and refreshes the chat's `updated_at`.
    pub fn insert_message(
        conn: &Connection,
        chat_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> DbResult<Message> {
        in_transaction(conn, |conn| {
            let message = Self::insert_message_row(conn, chat_id, role, content)?;
            Self::touch_chat(conn, chat_id)?;
            Ok(message)
        })
    }

    /// Persists a user turn and the assistant's reply together.
    pub fn append_exchange(
        conn: &Connection,
        chat_id: Uuid,
        user_content: &str,
        assistant_content: &str,
    ) -> DbResult<(Message, Message)> {
        in_transaction(conn, |conn| {
            let user = Self::insert_message_row(conn, chat_id, MessageRole::User, user_content)?;
            let assistant =
                Self::insert_message_row(conn, chat_id, MessageRole::Assistant, assistant_content)?;
            Self::touch_chat(conn, chat_id)?;
            Ok((user, assistant))
        })
    }

    /// Oldest first.
    pub fn get_messages(conn: &Connection, chat_id: Uuid) -> DbResult<Vec<Message>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![chat_id.to_string()], Self::row_to_message)?;
        rows.collect()
    }
}
