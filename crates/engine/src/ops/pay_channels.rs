use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, PayChannel, PayChannelRegistry, ResultEngine,
    normalize::normalize_pay_channel_code,
    payment_channels::{self, MAX_LABEL_CHARS, MAX_VALUE_CHARS},
};

use super::{Engine, with_tx};

const PAY_CHANNEL_NOT_FOUND: &str = "payment channel";

fn checked_label(label: &str) -> ResultEngine<String> {
    let label = label.trim();
    if label.is_empty() {
        return Err(EngineError::InvalidInput(
            "payment channel label must not be empty".to_string(),
        ));
    }
    if label.chars().count() > MAX_LABEL_CHARS {
        return Err(EngineError::InvalidInput(format!(
            "payment channel label must be at most {MAX_LABEL_CHARS} characters"
        )));
    }
    Ok(label.to_string())
}

fn checked_value(value: &str) -> ResultEngine<String> {
    let Some(code) = normalize_pay_channel_code(value) else {
        return Err(EngineError::InvalidInput(
            "payment channel value must not be empty".to_string(),
        ));
    };
    if code.chars().count() > MAX_VALUE_CHARS {
        return Err(EngineError::InvalidInput(format!(
            "payment channel value must be at most {MAX_VALUE_CHARS} characters"
        )));
    }
    Ok(code)
}

impl Engine {
    pub(super) async fn registry_in<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<PayChannelRegistry> {
        let rows = payment_channels::Entity::find()
            .filter(payment_channels::Column::UserId.eq(user_id))
            .order_by_asc(payment_channels::Column::Id)
            .all(db)
            .await?;
        Ok(PayChannelRegistry::with_channels(
            rows.into_iter().map(|row| (row.value, row.label)),
        ))
    }

    async fn require_pay_channel<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
        user_id: &str,
    ) -> ResultEngine<payment_channels::Model> {
        payment_channels::Entity::find_by_id(id)
            .filter(payment_channels::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(PAY_CHANNEL_NOT_FOUND.to_string()))
    }

    /// Snapshot of the channels `user_id` may use: built-ins merged with
    /// their own rows.
    pub async fn pay_channel_registry(&self, user_id: &str) -> ResultEngine<PayChannelRegistry> {
        self.registry_in(&self.database, user_id).await
    }

    /// Channel code for a label or code, if it is one `user_id` may use.
    pub async fn resolve_pay_channel(
        &self,
        user_id: &str,
        raw: &str,
    ) -> ResultEngine<Option<String>> {
        let registry = self.pay_channel_registry(user_id).await?;
        Ok(registry
            .resolve(raw)
            .filter(|code| registry.is_allowed(code)))
    }

    pub async fn is_pay_channel_allowed(&self, user_id: &str, code: &str) -> ResultEngine<bool> {
        let registry = self.pay_channel_registry(user_id).await?;
        Ok(normalize_pay_channel_code(code).is_some_and(|code| registry.is_allowed(&code)))
    }

    pub async fn pay_channel_label(
        &self,
        user_id: &str,
        code: Option<&str>,
    ) -> ResultEngine<String> {
        Ok(self.pay_channel_registry(user_id).await?.label_for(code))
    }

    /// The user's own rows, oldest first. Built-ins are not listed.
    pub async fn list_pay_channels(&self, user_id: &str) -> ResultEngine<Vec<PayChannel>> {
        let rows = payment_channels::Entity::find()
            .filter(payment_channels::Column::UserId.eq(user_id))
            .order_by_asc(payment_channels::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(PayChannel::from).collect())
    }

    /// Add a channel. `value` is stored as a normalized code and must be
    /// unique per user; a built-in code may be added to relabel it.
    pub async fn create_pay_channel(
        &self,
        user_id: &str,
        value: &str,
        label: &str,
    ) -> ResultEngine<PayChannel> {
        let value = checked_value(value)?;
        let label = checked_label(label)?;
        let now = self.now();

        with_tx!(self, |db_tx| {
            let existing = payment_channels::Entity::find()
                .filter(payment_channels::Column::UserId.eq(user_id))
                .filter(payment_channels::Column::Value.eq(value.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "payment channel {value}"
                )));
            }

            let model = payment_channels::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id.to_string()),
                value: ActiveValue::Set(value),
                label: ActiveValue::Set(label),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok::<_, EngineError>(PayChannel::from(model))
        })
    }

    /// Relabel a channel; its code never changes.
    pub async fn update_pay_channel(
        &self,
        id: i64,
        user_id: &str,
        label: &str,
    ) -> ResultEngine<PayChannel> {
        let label = checked_label(label)?;
        let existing = self.require_pay_channel(&self.database, id, user_id).await?;

        let mut active: payment_channels::ActiveModel = existing.into();
        active.label = ActiveValue::Set(label);
        active.updated_at = ActiveValue::Set(self.now());
        Ok(active.update(&self.database).await?.into())
    }

    /// Expenses keep the code; it then shows as the raw code, or as the
    /// built-in label when the code is a built-in one.
    pub async fn delete_pay_channel(&self, id: i64, user_id: &str) -> ResultEngine<()> {
        let existing = self.require_pay_channel(&self.database, id, user_id).await?;
        payment_channels::Entity::delete_by_id(existing.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
