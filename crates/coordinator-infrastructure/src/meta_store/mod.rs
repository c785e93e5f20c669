//! The `MetaStore` adapter: durable, read-your-writes storage over
//! `sea-orm`/SQLite, backing every entity in the data model plus the
//! `tool_invocations` audit table.

pub mod conversions;
pub mod entities;
pub mod migration;

use async_trait::async_trait;
use coordinator_domain::entities::{
    ChatMessage, ChatSession, FileChunk, HttpToolDefinition, IndexedFile, IndexedFolder, KnowledgeEntry,
    SubAgentDefinition, SystemPrompt,
};
use coordinator_domain::error::{Error, ErrorKind, Result};
use coordinator_domain::ports::meta_store::{MetaStore, ToolInvocationRecord};
use coordinator_domain::value_objects::{FileId, FolderId, KnowledgeEntryId, SessionId, SubAgentId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use self::entities::{chunk, file, folder, http_tool, knowledge_entry, message, session, subagent, system_prompt, tool_invocation};
use self::migration::Migrator;

fn map_db_err(err: DbErr) -> Error {
    Error::internal(format!("meta store error: {err}"))
}

/// Durable storage for every entity in the data model, backed by a `sqlite://`
/// connection managed by `sea-orm`.
pub struct SeaOrmMetaStore {
    connection: DatabaseConnection,
}

impl SeaOrmMetaStore {
    /// Connect to `database_uri` and run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fatal`] if the connection cannot be established or
    /// migrations fail — the meta store is required at startup.
    pub async fn connect(database_uri: &str) -> Result<Self> {
        let connection = Database::connect(database_uri)
            .await
            .map_err(|err| Error::fatal(format!("connecting to meta store at '{database_uri}': {err}")))?;
        Migrator::up(&connection, None)
            .await
            .map_err(|err| Error::fatal(format!("running meta store migrations: {err}")))?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl MetaStore for SeaOrmMetaStore {
    // -- folders ------------------------------------------------------------

    async fn insert_folder(&self, folder: IndexedFolder) -> Result<()> {
        if self.find_folder_by_path(&folder.absolute_path).await?.is_some() {
            return Err(Error::already_registered(folder.absolute_path));
        }
        let model = conversions::folder_to_model(&folder);
        let active: folder::ActiveModel = model.into();
        active.insert(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn get_folder(&self, id: FolderId) -> Result<IndexedFolder> {
        let model = folder::Entity::find_by_id(id.to_string())
            .one(&self.connection)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| Error::not_found(format!("folder {id}")))?;
        conversions::folder_from_model(model)
    }

    async fn find_folder_by_path(&self, absolute_path: &str) -> Result<Option<IndexedFolder>> {
        let model = folder::Entity::find()
            .filter(folder::Column::AbsolutePath.eq(absolute_path))
            .one(&self.connection)
            .await
            .map_err(map_db_err)?;
        model.map(conversions::folder_from_model).transpose()
    }

    async fn update_folder(&self, folder: IndexedFolder) -> Result<()> {
        let model = conversions::folder_to_model(&folder);
        let active: folder::ActiveModel = model.into();
        active.reset_all().update(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn delete_folder(&self, id: FolderId) -> Result<()> {
        folder::Entity::delete_by_id(id.to_string()).exec(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn list_folders(&self) -> Result<Vec<IndexedFolder>> {
        let models = folder::Entity::find().all(&self.connection).await.map_err(map_db_err)?;
        models.into_iter().map(conversions::folder_from_model).collect()
    }

    // -- files ----------------------------------------------------------------

    async fn insert_file(&self, file: IndexedFile) -> Result<()> {
        let model = conversions::file_to_model(&file);
        let active: file::ActiveModel = model.into();
        active.insert(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn find_file_by_path(&self, folder_id: FolderId, absolute_path: &str) -> Result<Option<IndexedFile>> {
        let model = file::Entity::find()
            .filter(file::Column::FolderId.eq(folder_id.to_string()))
            .filter(file::Column::AbsolutePath.eq(absolute_path))
            .one(&self.connection)
            .await
            .map_err(map_db_err)?;
        model.map(conversions::file_from_model).transpose()
    }

    async fn update_file(&self, file: IndexedFile) -> Result<()> {
        let model = conversions::file_to_model(&file);
        let active: file::ActiveModel = model.into();
        active.reset_all().update(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn delete_file(&self, id: FileId) -> Result<()> {
        file::Entity::delete_by_id(id.to_string()).exec(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn list_files_for_folder(&self, folder_id: FolderId) -> Result<Vec<IndexedFile>> {
        let models = file::Entity::find()
            .filter(file::Column::FolderId.eq(folder_id.to_string()))
            .all(&self.connection)
            .await
            .map_err(map_db_err)?;
        models.into_iter().map(conversions::file_from_model).collect()
    }

    // -- chunks -----------------------------------------------------------------

    async fn insert_chunks(&self, chunks: Vec<FileChunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let actives: Vec<chunk::ActiveModel> =
            chunks.iter().map(conversions::chunk_to_model).map(Into::into).collect();
        let transaction = self.connection.begin().await.map_err(map_db_err)?;
        for active in actives {
            active.insert(&transaction).await.map_err(map_db_err)?;
        }
        transaction.commit().await.map_err(map_db_err)?;
        Ok(())
    }

    async fn list_chunks_for_file(&self, file_id: FileId) -> Result<Vec<FileChunk>> {
        let models = chunk::Entity::find()
            .filter(chunk::Column::FileId.eq(file_id.to_string()))
            .order_by_asc(chunk::Column::ChunkNumber)
            .all(&self.connection)
            .await
            .map_err(map_db_err)?;
        models.into_iter().map(conversions::chunk_from_model).collect()
    }

    async fn delete_chunks_for_file(&self, file_id: FileId) -> Result<()> {
        chunk::Entity::delete_many()
            .filter(chunk::Column::FileId.eq(file_id.to_string()))
            .exec(&self.connection)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    // -- chat sessions & messages -------------------------------------------------

    async fn insert_session(&self, session: ChatSession) -> Result<()> {
        let model = conversions::session_to_model(&session);
        let active: session::ActiveModel = model.into();
        active.insert(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<ChatSession> {
        let model = session::Entity::find_by_id(id.to_string())
            .one(&self.connection)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| Error::not_found(format!("chat session {id}")))?;
        conversions::session_from_model(model)
    }

    async fn update_session(&self, session: ChatSession) -> Result<()> {
        let model = conversions::session_to_model(&session);
        let active: session::ActiveModel = model.into();
        active.reset_all().update(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn append_message(&self, message: ChatMessage) -> Result<()> {
        let model = conversions::message_to_model(&message);
        let active: message::ActiveModel = model.into();
        active.insert(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn list_messages(&self, session_id: SessionId) -> Result<Vec<ChatMessage>> {
        let models = message::Entity::find()
            .filter(message::Column::SessionId.eq(session_id.to_string()))
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(&self.connection)
            .await
            .map_err(map_db_err)?;
        models.into_iter().map(conversions::message_from_model).collect()
    }

    // -- sub-agents & system prompts ------------------------------------------------

    async fn upsert_subagent(&self, subagent: SubAgentDefinition) -> Result<()> {
        let existing = subagent::Entity::find()
            .filter(subagent::Column::Name.eq(subagent.name.clone()))
            .one(&self.connection)
            .await
            .map_err(map_db_err)?;

        let mut model = conversions::subagent_to_model(&subagent);
        if let Some(existing) = existing {
            model.id = existing.id;
            let active: subagent::ActiveModel = model.into();
            active.reset_all().update(&self.connection).await.map_err(map_db_err)?;
        } else {
            let active: subagent::ActiveModel = model.into();
            active.insert(&self.connection).await.map_err(map_db_err)?;
        }
        Ok(())
    }

    async fn find_subagent_by_name(&self, name: &str) -> Result<Option<SubAgentDefinition>> {
        let model = subagent::Entity::find()
            .filter(subagent::Column::Name.eq(name))
            .one(&self.connection)
            .await
            .map_err(map_db_err)?;
        model.map(conversions::subagent_from_model).transpose()
    }

    async fn get_subagent(&self, id: SubAgentId) -> Result<SubAgentDefinition> {
        let model = subagent::Entity::find_by_id(id.to_string())
            .one(&self.connection)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| Error::not_found(format!("subagent {id}")))?;
        conversions::subagent_from_model(model)
    }

    async fn get_system_prompt(&self, user_id: &str, company_id: &str) -> Result<Option<SystemPrompt>> {
        let model = system_prompt::Entity::find()
            .filter(system_prompt::Column::UserId.eq(user_id))
            .filter(system_prompt::Column::CompanyId.eq(company_id))
            .one(&self.connection)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(conversions::system_prompt_from_model))
    }

    async fn set_system_prompt(&self, prompt: SystemPrompt) -> Result<()> {
        let existing = system_prompt::Entity::find()
            .filter(system_prompt::Column::UserId.eq(prompt.user_id.clone()))
            .filter(system_prompt::Column::CompanyId.eq(prompt.company_id.clone()))
            .one(&self.connection)
            .await
            .map_err(map_db_err)?;

        let model = conversions::system_prompt_to_model(&prompt);
        let active: system_prompt::ActiveModel = model.into();
        if existing.is_some() {
            active.reset_all().update(&self.connection).await.map_err(map_db_err)?;
        } else {
            active.insert(&self.connection).await.map_err(map_db_err)?;
        }
        Ok(())
    }

    // -- HTTP tool definitions ---------------------------------------------------

    async fn insert_http_tool(&self, tool: HttpToolDefinition) -> Result<()> {
        let model = conversions::http_tool_to_model(&tool)?;
        let active: http_tool::ActiveModel = model.into();
        active.insert(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn list_http_tools(&self) -> Result<Vec<HttpToolDefinition>> {
        let models = http_tool::Entity::find().all(&self.connection).await.map_err(map_db_err)?;
        models.into_iter().map(conversions::http_tool_from_model).collect()
    }

    // -- knowledge entries -----------------------------------------------------------

    async fn insert_knowledge_entry(&self, entry: KnowledgeEntry) -> Result<()> {
        let model = conversions::knowledge_entry_to_model(&entry)?;
        let active: knowledge_entry::ActiveModel = model.into();
        active.insert(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn get_knowledge_entry(&self, id: KnowledgeEntryId) -> Result<KnowledgeEntry> {
        let model = knowledge_entry::Entity::find_by_id(id.to_string())
            .one(&self.connection)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| Error::not_found(format!("knowledge entry {id}")))?;
        conversions::knowledge_entry_from_model(model)
    }

    // -- tool invocation audit ----------------------------------------------------

    async fn record_tool_invocation(&self, record: ToolInvocationRecord) -> Result<()> {
        let active = tool_invocation::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            session_id: Set(record.session_id.to_string()),
            tool_name: Set(record.tool_name),
            args_digest: Set(record.args_digest),
            duration_ms: Set(record.duration_ms as i64),
            error_kind: Set(record.error_kind.map(error_kind_to_string)),
            completed_at: Set(record.completed_at),
        };
        active.insert(&self.connection).await.map_err(map_db_err)?;
        Ok(())
    }

    // -- health -----------------------------------------------------------------

    async fn ping(&self) -> Result<()> {
        folder::Entity::find()
            .limit(1)
            .all(&self.connection)
            .await
            .map(|_| ())
            .map_err(|err| Error::upstream_unavailable("meta_store", err.to_string()))
    }
}

fn error_kind_to_string(kind: ErrorKind) -> String {
    format!("{kind:?}")
}
