use anyhow::Result;
use async_trait::async_trait;

use super::db::{contact_message_from_row, encode_timestamp, DbConnection};
use crate::domain::models::contact_message::ContactMessage;
use crate::storage::traits::ContactStorage;

#[async_trait]
impl ContactStorage for DbConnection {
    async fn store_contact_message(&self, message: &ContactMessage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contact_messages (id, name, email, phone, subject, message, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.phone)
        .bind(&message.subject)
        .bind(&message.message)
        .bind(&message.status)
        .bind(encode_timestamp(&message.created_at))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_contact_message(&self, message_id: &str) -> Result<Option<ContactMessage>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, subject, message, status, created_at
            FROM contact_messages
            WHERE id = ?
            "#,
        )
        .bind(message_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(contact_message_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::contact_message::STATUS_NEW;
    use chrono::Utc;

    #[tokio::test]
    async fn test_store_and_get_contact_message() {
        let db = DbConnection::init_test().await.unwrap();
        let message = ContactMessage {
            id: ContactMessage::generate_id(),
            name: "Dana Reyes".to_string(),
            email: "dana@example.com".to_string(),
            phone: None,
            subject: "Field access".to_string(),
            message: "Is the north gate open on Saturdays?".to_string(),
            status: STATUS_NEW.to_string(),
            created_at: Utc::now(),
        };

        db.store_contact_message(&message).await.unwrap();

        let loaded = db.get_contact_message(&message.id).await.unwrap().expect("message stored");
        assert_eq!(loaded, message);
        assert!(db.get_contact_message("contact::missing").await.unwrap().is_none());
    }
}
