// ==========================================
// 装箱发货计划 - 进程配置
// ==========================================
// 职责: 从环境变量加载服务配置，缺省时使用默认值
// 优先级: 命令行参数 > 环境变量 > 默认值
// ==========================================

use crate::domain::pack_size::{parse_pack_sizes, DEFAULT_PACK_SIZES};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("配置项 {key} 无效: {message}")]
    InvalidValue { key: String, message: String },
}

// ==========================================
// 环境变量键
// ==========================================
pub mod env_keys {
    pub const PORT: &str = "PACK_PLANNER_PORT";
    pub const DB_PATH: &str = "PACK_PLANNER_DB_PATH";
    pub const STORE: &str = "PACK_PLANNER_STORE";
    pub const DEFAULT_PACKS: &str = "PACK_PLANNER_DEFAULT_PACKS";
    pub const MAX_ORDER: &str = "PACK_PLANNER_MAX_ORDER";
    pub const MAX_PACK_SIZE: &str = "PACK_PLANNER_MAX_PACK_SIZE";
    pub const WEB_DIR: &str = "PACK_PLANNER_WEB_DIR";
}

/// 默认端口
pub const DEFAULT_PORT: u16 = 8080;

/// 订单数量上限（约束动态规划表内存）
pub const DEFAULT_MAX_ORDER_QUANTITY: i64 = 1_000_000;

/// 单个箱型上限
pub const DEFAULT_MAX_PACK_SIZE: i64 = 1_000_000;

// ==========================================
// StoreKind - 箱型存储类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Sqlite,
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StoreKind::Sqlite),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("未知存储类型: {}", other)),
        }
    }
}

// ==========================================
// PlanningLimits - 计算输入上限
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanningLimits {
    pub max_order_quantity: i64,
    pub max_pack_size: i64,
}

impl Default for PlanningLimits {
    fn default() -> Self {
        Self {
            max_order_quantity: DEFAULT_MAX_ORDER_QUANTITY,
            max_pack_size: DEFAULT_MAX_PACK_SIZE,
        }
    }
}

// ==========================================
// AppConfig - 服务配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub port: u16,
    /// 显式指定的数据库路径；None 时在打开 SQLite 存储时才解析默认路径
    pub db_path: Option<String>,
    pub store: StoreKind,
    pub default_pack_sizes: Vec<i64>,
    pub limits: PlanningLimits,
    pub web_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: None,
            store: StoreKind::Sqlite,
            default_pack_sizes: DEFAULT_PACK_SIZES.to_vec(),
            limits: PlanningLimits::default(),
            web_dir: PathBuf::from("./web"),
        }
    }
}

impl AppConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get(env_keys::PORT) {
            config.port = parse_value(env_keys::PORT, &v)?;
        }
        if let Some(v) = get(env_keys::DB_PATH) {
            config.db_path = Some(v);
        }
        if let Some(v) = get(env_keys::STORE) {
            config.store = v.parse().map_err(|message| ConfigError::InvalidValue {
                key: env_keys::STORE.to_string(),
                message,
            })?;
        }
        if let Some(v) = get(env_keys::DEFAULT_PACKS) {
            config.default_pack_sizes =
                parse_pack_sizes(&v).map_err(|message| ConfigError::InvalidValue {
                    key: env_keys::DEFAULT_PACKS.to_string(),
                    message,
                })?;
        }
        if let Some(v) = get(env_keys::MAX_ORDER) {
            config.limits.max_order_quantity = parse_value(env_keys::MAX_ORDER, &v)?;
        }
        if let Some(v) = get(env_keys::MAX_PACK_SIZE) {
            config.limits.max_pack_size = parse_value(env_keys::MAX_PACK_SIZE, &v)?;
        }
        if let Some(v) = get(env_keys::WEB_DIR) {
            config.web_dir = PathBuf::from(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// 实际使用的数据库路径（未显式指定时回退到用户数据目录）
    pub fn resolve_db_path(&self) -> String {
        self.db_path.clone().unwrap_or_else(get_default_db_path)
    }

    /// 配置一致性校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_order_quantity < 1 {
            return Err(ConfigError::InvalidValue {
                key: env_keys::MAX_ORDER.to_string(),
                message: "必须大于0".to_string(),
            });
        }
        if self.limits.max_pack_size < 1 {
            return Err(ConfigError::InvalidValue {
                key: env_keys::MAX_PACK_SIZE.to_string(),
                message: "必须大于0".to_string(),
            });
        }
        if self.default_pack_sizes.is_empty()
            || self
                .default_pack_sizes
                .iter()
                .any(|&s| s < 1 || s > self.limits.max_pack_size)
        {
            return Err(ConfigError::InvalidValue {
                key: env_keys::DEFAULT_PACKS.to_string(),
                message: format!(
                    "默认箱型必须非空且在 1..={} 之间: {:?}",
                    self.limits.max_pack_size, self.default_pack_sizes
                ),
            });
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{}': {}", raw, e),
    })
}

/// 默认数据库路径（用户数据目录下；PACK_PLANNER_DB_PATH 由 from_lookup 处理）
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./pack_planner.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("pack-planner");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("pack_planner.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.default_pack_sizes, vec![250, 500, 1000, 2000, 5000]);
        assert_eq!(config.limits, PlanningLimits::default());
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (env_keys::PORT, "9090"),
            (env_keys::STORE, "Memory"),
            (env_keys::DEFAULT_PACKS, "23, 31, 53"),
            (env_keys::MAX_ORDER, "1000"),
            (env_keys::DB_PATH, "/tmp/p.db"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.default_pack_sizes, vec![23, 31, 53]);
        assert_eq!(config.limits.max_order_quantity, 1000);
        assert_eq!(config.db_path.as_deref(), Some("/tmp/p.db"));
        assert_eq!(config.resolve_db_path(), "/tmp/p.db");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(env_keys::PORT, "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == env_keys::PORT));

        assert!(AppConfig::from_lookup(lookup_from(&[(env_keys::STORE, "redis")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[(env_keys::DEFAULT_PACKS, "0,250")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[(env_keys::MAX_ORDER, "0")])).is_err());
    }

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
    }
}
