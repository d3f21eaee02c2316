//! Database connection and table creation using `SeaORM`.
//!
//! Tables are created from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL. Creation is idempotent via
//! `if_not_exists`, which doubles as the (single) migration mechanism for a
//! fresh install.

use crate::entities::{
    Assignment, AuditLog, Fund, FundMember, InstallmentPayment, Month, MonthlyPayment, Session,
    User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the given URL.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Fund),
        schema.create_table_from_entity(FundMember),
        schema.create_table_from_entity(Month),
        schema.create_table_from_entity(Assignment),
        schema.create_table_from_entity(InstallmentPayment),
        schema.create_table_from_entity(MonthlyPayment),
        schema.create_table_from_entity(Session),
        schema.create_table_from_entity(AuditLog),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(statement)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FundModel, MonthModel, UserModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist if querying them succeeds
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<FundModel> = Fund::find().limit(1).all(&db).await?;
        let _: Vec<MonthModel> = Month::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        Ok(())
    }
}
