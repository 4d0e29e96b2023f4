// ==========================================
// 装箱发货计划 - 箱型配置仓储
// ==========================================
// 职责: 保存"当前箱型列表"这一全局配置
// 并发: 单写多读；读出总是独立副本
// 存储: 内存（RwLock）/ SQLite config_kv 表
// ==========================================

use crate::db::{
    init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION,
};
use crate::domain::pack_size::PackSizeSnapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// config_kv 中箱型列表的作用域
pub const PACK_SIZES_SCOPE: &str = "global";

/// config_kv 中箱型列表的键
pub const PACK_SIZES_KEY: &str = "pack_sizes";

// ==========================================
// PackSizeStore - 箱型配置存储接口
// ==========================================

/// 箱型配置存储
///
/// 实现必须保证：
/// - 更新为整体替换（原子）
/// - 读出为独立副本
pub trait PackSizeStore: Send + Sync {
    /// 读取当前箱型列表（副本）
    fn get_pack_sizes(&self) -> RepositoryResult<Vec<i64>> {
        Ok(self.snapshot()?.sizes)
    }

    /// 读取当前箱型列表快照（含修订号、更新时间）
    fn snapshot(&self) -> RepositoryResult<PackSizeSnapshot>;

    /// 整体替换箱型列表
    fn update_pack_sizes(&self, sizes: &[i64]) -> RepositoryResult<()>;
}

// ==========================================
// MemoryPackSizeStore - 内存存储
// ==========================================
pub struct MemoryPackSizeStore {
    inner: RwLock<PackSizeSnapshot>,
}

impl MemoryPackSizeStore {
    /// 使用默认箱型创建（复制传入列表）
    pub fn new(default_sizes: &[i64]) -> Self {
        Self {
            inner: RwLock::new(PackSizeSnapshot::new(default_sizes.to_vec(), 1)),
        }
    }
}

impl PackSizeStore for MemoryPackSizeStore {
    fn snapshot(&self) -> RepositoryResult<PackSizeSnapshot> {
        let guard = self
            .inner
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(guard.clone())
    }

    fn update_pack_sizes(&self, sizes: &[i64]) -> RepositoryResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let revision = guard.revision + 1;
        *guard = PackSizeSnapshot::new(sizes.to_vec(), revision);
        Ok(())
    }
}

// ==========================================
// SqlitePackSizeStore - SQLite 存储
// ==========================================
pub struct SqlitePackSizeStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePackSizeStore {
    /// 打开（或创建）数据库；尚无箱型配置时写入默认值
    pub fn open(db_path: &str, default_sizes: &[i64]) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)), default_sizes)
    }

    /// 从已有连接创建
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
        default_sizes: &[i64],
    ) -> RepositoryResult<Self> {
        let store = Self { conn };
        {
            let conn = store.get_conn()?;
            init_schema(&conn)?;

            let version = read_schema_version(&conn)?;
            if version != Some(CURRENT_SCHEMA_VERSION) {
                tracing::warn!(
                    found = ?version,
                    expected = CURRENT_SCHEMA_VERSION,
                    "数据库 schema_version 与当前版本不一致"
                );
            }

            let value = serde_json::to_string(default_sizes)?;
            let seeded = conn.execute(
                "INSERT OR IGNORE INTO config_kv (scope_id, key, value, revision, updated_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![PACK_SIZES_SCOPE, PACK_SIZES_KEY, value, Utc::now()],
            )?;
            if seeded > 0 {
                tracing::info!("写入默认箱型: {:?}", default_sizes);
            }
        }
        Ok(store)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl PackSizeStore for SqlitePackSizeStore {
    fn snapshot(&self) -> RepositoryResult<PackSizeSnapshot> {
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                "SELECT value, revision, updated_at FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![PACK_SIZES_SCOPE, PACK_SIZES_KEY],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, DateTime<Utc>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((value, revision, updated_at)) = row else {
            return Err(RepositoryError::ValidationError(format!(
                "配置不存在: {}/{}",
                PACK_SIZES_SCOPE, PACK_SIZES_KEY
            )));
        };

        let sizes: Vec<i64> = serde_json::from_str(&value).map_err(|e| {
            RepositoryError::ValidationError(format!("箱型配置格式错误: {} ({})", value, e))
        })?;

        Ok(PackSizeSnapshot {
            sizes,
            revision: revision.max(0) as u64,
            updated_at,
        })
    }

    fn update_pack_sizes(&self, sizes: &[i64]) -> RepositoryResult<()> {
        let value = serde_json::to_string(sizes)?;
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, revision, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4)
             ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                revision = config_kv.revision + 1,
                updated_at = excluded.updated_at",
            params![PACK_SIZES_SCOPE, PACK_SIZES_KEY, value, Utc::now()],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_copies_defaults() {
        let mut defaults = vec![250, 500];
        let store = MemoryPackSizeStore::new(&defaults);
        defaults.push(1000);

        assert_eq!(store.get_pack_sizes().unwrap(), vec![250, 500]);
    }

    #[test]
    fn test_memory_store_snapshot_is_independent() {
        let store = MemoryPackSizeStore::new(&[250, 500]);
        let mut snapshot = store.get_pack_sizes().unwrap();
        snapshot.push(9999);

        assert_eq!(store.get_pack_sizes().unwrap(), vec![250, 500]);
    }

    #[test]
    fn test_memory_store_update_bumps_revision() {
        let store = MemoryPackSizeStore::new(&[250]);
        assert_eq!(store.snapshot().unwrap().revision, 1);

        store.update_pack_sizes(&[23, 31, 53]).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.sizes, vec![23, 31, 53]);
    }

    #[test]
    fn test_sqlite_store_in_memory_round() {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let store = SqlitePackSizeStore::from_connection(conn, &[250, 500]).unwrap();

        assert_eq!(store.get_pack_sizes().unwrap(), vec![250, 500]);

        store.update_pack_sizes(&[1000, 2000]).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.sizes, vec![1000, 2000]);
        assert_eq!(snapshot.revision, 2);
    }

    #[test]
    fn test_sqlite_store_opens_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION + 1],
        )
        .unwrap();

        let conn = Arc::new(Mutex::new(conn));
        let store = SqlitePackSizeStore::from_connection(conn.clone(), &[250]).unwrap();

        assert_eq!(store.get_pack_sizes().unwrap(), vec![250]);
        assert_eq!(
            read_schema_version(&conn.lock().unwrap()).unwrap(),
            Some(CURRENT_SCHEMA_VERSION + 1)
        );
    }

    #[test]
    fn test_sqlite_store_rejects_corrupt_value() {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let store = SqlitePackSizeStore::from_connection(conn.clone(), &[250]).unwrap();

        conn.lock()
            .unwrap()
            .execute(
                "UPDATE config_kv SET value = 'not-json' WHERE key = ?1",
                params![PACK_SIZES_KEY],
            )
            .unwrap();

        let err = store.snapshot().unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }
}
