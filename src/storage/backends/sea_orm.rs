use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use tracing::{debug, error, info, trace};

use crate::clicks::ClickSink;
use crate::errors::{LinkletError, Result};
use crate::storage::{LinkStore, NewLink, ShortLinkRecord};

use migration::{Migrator, MigratorTrait, entities::short_link};

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStore {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkletError::database_config("DATABASE_URL 未设置"));
        }

        let db = if backend_name == "sqlite" {
            Self::connect_sqlite(database_url).await?
        } else {
            Self::connect_generic(database_url, backend_name).await?
        };

        let store = SeaOrmStore {
            db,
            backend_name: backend_name.to_string(),
        };

        store.run_migrations().await?;

        info!("{} store initialized", store.backend_name.to_uppercase());
        Ok(store)
    }

    /// 连接 SQLite 数据库（带自动创建和性能优化）
    async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::SqlitePool;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| LinkletError::database_config(format!("SQLite URL 解析失败: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
            LinkletError::database_connection(format!("无法连接到 SQLite 数据库: {}", e))
        })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 连接通用数据库（MySQL/PostgreSQL）
    async fn connect_generic(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(database_url.to_owned());
        opt.max_connections(100)
            .min_connections(5)
            .connect_timeout(std::time::Duration::from_secs(8))
            .acquire_timeout(std::time::Duration::from_secs(8))
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            LinkletError::database_connection(format!(
                "无法连接到 {} 数据库: {}",
                backend_name.to_uppercase(),
                e
            ))
        })
    }

    async fn run_migrations(&self) -> Result<()> {
        Migrator::up(&self.db, None)
            .await
            .map_err(|e| LinkletError::database_operation(format!("迁移失败: {}", e)))?;

        debug!("Database migrations completed");
        Ok(())
    }

    fn model_to_record(model: short_link::Model) -> ShortLinkRecord {
        ShortLinkRecord {
            short_id: model.short_id,
            long_url: model.long_url,
            owner: model.owner,
            title: model.title,
            clicks: model.click_count.max(0),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    /// 判断是否是唯一约束冲突错误
    fn is_unique_violation(err: &sea_orm::sqlx::Error) -> bool {
        use sea_orm::sqlx::Error;

        match err {
            Error::Database(db_err) => {
                let code = db_err.code();
                // SQLite: SQLITE_CONSTRAINT_PRIMARYKEY (1555) / _UNIQUE (2067)
                // MySQL: ER_DUP_ENTRY (1062)
                // PostgreSQL: unique_violation (23505)
                code.as_ref()
                    .map(|c| c == "1555" || c == "2067" || c == "1062" || c == "23505")
                    .unwrap_or(false)
            }
            _ => false,
        }
    }
}

#[async_trait]
impl LinkStore for SeaOrmStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        let found = short_link::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LinkletError::database_operation(format!("查询短链接失败: {}", e)))?;
        Ok(found.is_some())
    }

    async fn find(&self, id: &str) -> Result<Option<ShortLinkRecord>> {
        let found = short_link::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LinkletError::database_operation(format!("查询短链接失败: {}", e)))?;
        Ok(found.map(Self::model_to_record))
    }

    async fn create(&self, link: NewLink) -> Result<ShortLinkRecord> {
        use sea_orm::ActiveValue::Set;

        let now = chrono::Utc::now();
        let active = short_link::ActiveModel {
            short_id: Set(link.short_id.clone()),
            long_url: Set(link.long_url),
            owner: Set(link.owner),
            title: Set(link.title),
            click_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match active.insert(&self.db).await {
            Ok(model) => {
                info!("Short link created: {}", model.short_id);
                Ok(Self::model_to_record(model))
            }
            Err(sea_orm::DbErr::Exec(sea_orm::RuntimeErr::SqlxError(sqlx_err)))
                if Self::is_unique_violation(&sqlx_err) =>
            {
                // 唯一约束冲突：并发分配或自定义 ID 已被占用
                Err(LinkletError::duplicate_id(format!(
                    "Short id already taken: {}",
                    link.short_id
                )))
            }
            Err(e) => Err(LinkletError::database_operation(format!(
                "插入短链接失败: {}",
                e
            ))),
        }
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<()> {
        let result = short_link::Entity::delete_many()
            .filter(short_link::Column::ShortId.eq(id))
            .filter(short_link::Column::Owner.eq(owner))
            .exec(&self.db)
            .await
            .map_err(|e| LinkletError::database_operation(format!("删除短链接失败: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LinkletError::not_found(format!("短链接不存在: {}", id)));
        }

        info!("Short link deleted: {}", id);
        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<ShortLinkRecord>> {
        let models = short_link::Entity::find()
            .filter(short_link::Column::Owner.eq(owner))
            .order_by_desc(short_link::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LinkletError::database_operation(format!("查询链接列表失败: {}", e)))?;

        Ok(models.into_iter().map(Self::model_to_record).collect())
    }

    fn as_click_sink(&self) -> Option<Arc<dyn ClickSink>> {
        Some(Arc::new(self.clone()) as Arc<dyn ClickSink>)
    }
}

#[async_trait]
impl ClickSink for SeaOrmStore {
    async fn flush_clicks(&self, updates: Vec<(String, u64)>) -> anyhow::Result<u64> {
        use sea_orm::{ExprTrait, TransactionTrait, sea_query::Expr};

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| anyhow::anyhow!("开始事务失败: {}", e))?;

        let mut updated = 0u64;
        for (short_id, delta) in updates {
            // 原子增量更新，避免读-改-写竞态
            let result = short_link::Entity::update_many()
                .col_expr(
                    short_link::Column::ClickCount,
                    Expr::col(short_link::Column::ClickCount).add(delta as i64),
                )
                .filter(short_link::Column::ShortId.eq(&short_id))
                .exec(&txn)
                .await;

            match result {
                Ok(res) => updated += res.rows_affected,
                Err(e) => error!("点击计数更新失败 {}: {}", short_id, e),
            }
        }

        txn.commit()
            .await
            .map_err(|e| anyhow::anyhow!("提交事务失败: {}", e))?;

        trace!(
            "点击计数已刷新到 {} 数据库",
            self.backend_name.to_uppercase()
        );
        Ok(updated)
    }
}
