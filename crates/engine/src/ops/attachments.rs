use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{Attachment, AttachmentStore, EngineError, ResultEngine, expense_attachments};

use super::{Engine, access::ATTACHMENT_NOT_FOUND};

/// An uploaded file, before it is stored.
#[derive(Clone, Debug)]
pub struct AttachmentUpload {
    pub original_name: Option<String>,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Blob content ready to be served.
#[derive(Clone, Debug)]
pub struct AttachmentFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

fn checked_file_name(file_name: &str) -> ResultEngine<&str> {
    if AttachmentStore::is_valid_name(file_name) {
        Ok(file_name)
    } else {
        Err(EngineError::InvalidInput(format!(
            "invalid attachment file name: {file_name}"
        )))
    }
}

impl Engine {
    pub(super) async fn attachments_of_expense(
        &self,
        expense_id: i64,
    ) -> ResultEngine<Vec<Attachment>> {
        let rows = expense_attachments::Entity::find()
            .filter(expense_attachments::Column::ExpenseId.eq(expense_id))
            .order_by_asc(expense_attachments::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(Attachment::from).collect())
    }

    pub(super) async fn read_attachment(
        &self,
        attachment: expense_attachments::Model,
    ) -> ResultEngine<AttachmentFile> {
        let bytes = match self.attachments.read(&attachment.file_name).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("attachment blob {} is missing", attachment.file_name);
                return Err(EngineError::KeyNotFound(ATTACHMENT_NOT_FOUND.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(AttachmentFile {
            file_name: attachment.file_name,
            mime_type: attachment.mime_type,
            bytes,
        })
    }

    pub async fn list_attachments(
        &self,
        expense_id: i64,
        user_id: &str,
    ) -> ResultEngine<Vec<Attachment>> {
        let expense = self
            .require_expense(&self.database, expense_id, user_id)
            .await?;
        self.attachments_of_expense(expense.id).await
    }

    /// Store an image for an expense. The blob is written before the row; if
    /// the row cannot be inserted the blob is removed again.
    pub async fn add_attachment(
        &self,
        expense_id: i64,
        user_id: &str,
        upload: AttachmentUpload,
    ) -> ResultEngine<Attachment> {
        let mime_type = upload.mime_type.trim().to_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(EngineError::InvalidInput(
                "only image uploads are accepted".to_string(),
            ));
        }
        if upload.bytes.is_empty() {
            return Err(EngineError::InvalidInput("file is empty".to_string()));
        }

        let expense = self
            .require_expense(&self.database, expense_id, user_id)
            .await?;
        let original_name = upload
            .original_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);
        let file_name = AttachmentStore::generate_name(&mime_type, original_name.as_deref());

        self.attachments.write(&file_name, &upload.bytes).await?;

        let inserted = expense_attachments::ActiveModel {
            id: ActiveValue::NotSet,
            expense_id: ActiveValue::Set(expense.id),
            file_name: ActiveValue::Set(file_name.clone()),
            original_name: ActiveValue::Set(original_name),
            mime_type: ActiveValue::Set(mime_type),
            size_bytes: ActiveValue::Set(i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX)),
            created_at: ActiveValue::Set(self.now()),
        }
        .insert(&self.database)
        .await;

        match inserted {
            Ok(model) => Ok(model.into()),
            Err(err) => {
                self.attachments.remove(&file_name).await;
                Err(err.into())
            }
        }
    }

    pub async fn delete_attachment(
        &self,
        expense_id: i64,
        attachment_id: i64,
        user_id: &str,
    ) -> ResultEngine<()> {
        let expense = self
            .require_expense(&self.database, expense_id, user_id)
            .await?;
        let attachment = expense_attachments::Entity::find_by_id(attachment_id)
            .filter(expense_attachments::Column::ExpenseId.eq(expense.id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(ATTACHMENT_NOT_FOUND.to_string()))?;

        expense_attachments::Entity::delete_by_id(attachment.id)
            .exec(&self.database)
            .await?;
        self.attachments.remove(&attachment.file_name).await;
        Ok(())
    }

    /// Content of a blob owned by `user_id`.
    pub async fn attachment_file(
        &self,
        file_name: &str,
        user_id: &str,
    ) -> ResultEngine<AttachmentFile> {
        let file_name = checked_file_name(file_name)?;
        let attachment = self
            .require_attachment_file(&self.database, file_name, user_id, None)
            .await?;
        self.read_attachment(attachment).await
    }

    pub(super) async fn attachment_file_of_book(
        &self,
        file_name: &str,
        user_id: &str,
        book_id: i64,
    ) -> ResultEngine<AttachmentFile> {
        let file_name = checked_file_name(file_name)?;
        let attachment = self
            .require_attachment_file(&self.database, file_name, user_id, Some(book_id))
            .await?;
        self.read_attachment(attachment).await
    }
}
