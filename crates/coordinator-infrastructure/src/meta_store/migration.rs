//! Schema migration: a single `sea-orm-migration` step that creates every
//! table named in the persisted state layout. Later schema changes get
//! their own migration appended to `Migrator::migrations`, never a rewrite
//! of this one.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(M20240101_000001CreateTables)]
    }
}

#[derive(DeriveMigrationName)]
pub struct M20240101_000001CreateTables;

#[async_trait::async_trait]
impl MigrationTrait for M20240101_000001CreateTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Folders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Folders::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Folders::AbsolutePath).string().not_null().unique_key())
                    .col(ColumnDef::new(Folders::Description).string())
                    .col(ColumnDef::new(Folders::Status).string().not_null())
                    .col(ColumnDef::new(Folders::AddedAt).timestamp().not_null())
                    .col(ColumnDef::new(Folders::LastScannedAt).timestamp())
                    .col(ColumnDef::new(Folders::FileCount).big_integer().not_null())
                    .col(ColumnDef::new(Folders::LastError).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Files::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Files::FolderId).string().not_null())
                    .col(ColumnDef::new(Files::AbsolutePath).string().not_null())
                    .col(ColumnDef::new(Files::RelativePath).string().not_null())
                    .col(ColumnDef::new(Files::Language).string())
                    .col(ColumnDef::new(Files::ContentHash).string().not_null())
                    .col(ColumnDef::new(Files::Size).big_integer().not_null())
                    .col(ColumnDef::new(Files::LineCount).big_integer().not_null())
                    .col(ColumnDef::new(Files::ChunkCount).integer().not_null())
                    .col(ColumnDef::new(Files::IndexedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_files_folder_path")
                    .table(Files::Table)
                    .col(Files::FolderId)
                    .col(Files::AbsolutePath)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Chunks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Chunks::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Chunks::FileId).string().not_null())
                    .col(ColumnDef::new(Chunks::ChunkNumber).integer().not_null())
                    .col(ColumnDef::new(Chunks::Content).text().not_null())
                    .col(ColumnDef::new(Chunks::StartLine).big_integer().not_null())
                    .col(ColumnDef::new(Chunks::EndLine).big_integer().not_null())
                    .col(ColumnDef::new(Chunks::VectorId).string().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_chunks_file_id")
                    .table(Chunks::Table)
                    .col(Chunks::FileId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatSessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChatSessions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(ChatSessions::UserId).string().not_null())
                    .col(ColumnDef::new(ChatSessions::CompanyId).string().not_null())
                    .col(ColumnDef::new(ChatSessions::Title).string().not_null())
                    .col(ColumnDef::new(ChatSessions::ActiveSubagentId).string())
                    .col(ColumnDef::new(ChatSessions::ParentSessionId).string())
                    .col(ColumnDef::new(ChatSessions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ChatSessions::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChatMessages::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(ChatMessages::SessionId).string().not_null())
                    .col(ColumnDef::new(ChatMessages::Role).string().not_null())
                    .col(ColumnDef::new(ChatMessages::Content).text().not_null())
                    .col(ColumnDef::new(ChatMessages::ToolCallId).string())
                    .col(ColumnDef::new(ChatMessages::ToolName).string())
                    .col(ColumnDef::new(ChatMessages::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_session_id")
                    .table(ChatMessages::Table)
                    .col(ChatMessages::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subagents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Subagents::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Subagents::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Subagents::Description).string().not_null())
                    .col(ColumnDef::new(Subagents::SystemPrompt).text().not_null())
                    .col(ColumnDef::new(Subagents::ToolsJson).string().not_null())
                    .col(ColumnDef::new(Subagents::Category).string())
                    .col(ColumnDef::new(Subagents::UserId).string())
                    .col(ColumnDef::new(Subagents::CompanyId).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SystemPrompts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SystemPrompts::UserId).string().not_null())
                    .col(ColumnDef::new(SystemPrompts::CompanyId).string().not_null())
                    .col(ColumnDef::new(SystemPrompts::Text).text().not_null())
                    .col(ColumnDef::new(SystemPrompts::UpdatedAt).timestamp().not_null())
                    .primary_key(
                        Index::create().col(SystemPrompts::UserId).col(SystemPrompts::CompanyId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HttpTools::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(HttpTools::Name).string().not_null().primary_key())
                    .col(ColumnDef::new(HttpTools::Description).string().not_null())
                    .col(ColumnDef::new(HttpTools::Endpoint).string().not_null())
                    .col(ColumnDef::new(HttpTools::Method).string().not_null())
                    .col(ColumnDef::new(HttpTools::HeadersJson).string().not_null())
                    .col(ColumnDef::new(HttpTools::ParametersJson).string().not_null())
                    .col(ColumnDef::new(HttpTools::AuthType).string().not_null())
                    .col(ColumnDef::new(HttpTools::AuthConfigJson).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(KnowledgeEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(KnowledgeEntries::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(KnowledgeEntries::Collection).string().not_null())
                    .col(ColumnDef::new(KnowledgeEntries::Text).text().not_null())
                    .col(ColumnDef::new(KnowledgeEntries::MetadataJson).string().not_null())
                    .col(ColumnDef::new(KnowledgeEntries::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ToolInvocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ToolInvocations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ToolInvocations::SessionId).string().not_null())
                    .col(ColumnDef::new(ToolInvocations::ToolName).string().not_null())
                    .col(ColumnDef::new(ToolInvocations::ArgsDigest).string().not_null())
                    .col(ColumnDef::new(ToolInvocations::DurationMs).big_integer().not_null())
                    .col(ColumnDef::new(ToolInvocations::ErrorKind).string())
                    .col(ColumnDef::new(ToolInvocations::CompletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            ToolInvocations::Table.into_iden(),
            KnowledgeEntries::Table.into_iden(),
            HttpTools::Table.into_iden(),
            SystemPrompts::Table.into_iden(),
            Subagents::Table.into_iden(),
            ChatMessages::Table.into_iden(),
            ChatSessions::Table.into_iden(),
            Chunks::Table.into_iden(),
            Files::Table.into_iden(),
            Folders::Table.into_iden(),
        ] {
            manager.drop_table(Table::drop().table(table).if_exists().to_owned()).await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Folders {
    Table,
    Id,
    AbsolutePath,
    Description,
    Status,
    AddedAt,
    LastScannedAt,
    FileCount,
    LastError,
}

#[derive(DeriveIden)]
enum Files {
    Table,
    Id,
    FolderId,
    AbsolutePath,
    RelativePath,
    Language,
    ContentHash,
    Size,
    LineCount,
    ChunkCount,
    IndexedAt,
}

#[derive(DeriveIden)]
enum Chunks {
    Table,
    Id,
    FileId,
    ChunkNumber,
    Content,
    StartLine,
    EndLine,
    VectorId,
}

#[derive(DeriveIden)]
enum ChatSessions {
    Table,
    Id,
    UserId,
    CompanyId,
    Title,
    ActiveSubagentId,
    ParentSessionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChatMessages {
    Table,
    Id,
    SessionId,
    Role,
    Content,
    ToolCallId,
    ToolName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Subagents {
    Table,
    Id,
    Name,
    Description,
    SystemPrompt,
    ToolsJson,
    Category,
    UserId,
    CompanyId,
}

#[derive(DeriveIden)]
enum SystemPrompts {
    Table,
    UserId,
    CompanyId,
    Text,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum HttpTools {
    Table,
    Name,
    Description,
    Endpoint,
    Method,
    HeadersJson,
    ParametersJson,
    AuthType,
    AuthConfigJson,
}

#[derive(DeriveIden)]
enum KnowledgeEntries {
    Table,
    Id,
    Collection,
    Text,
    MetadataJson,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ToolInvocations {
    Table,
    Id,
    SessionId,
    ToolName,
    ArgsDigest,
    DurationMs,
    ErrorKind,
    CompletedAt,
}
