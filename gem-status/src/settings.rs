//! 应用设置
//!
//! 设置以 JSON 保存在用户配置目录下，缺失或损坏时回退到默认值。

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gem_core::{AudioSettings, SceneLayout, SessionPolicy};
use protocol::{DatagramConfig, DEFAULT_STATUS_PORT, SEND_INTERVAL_MS};

use crate::broadcaster::BroadcasterConfig;

/// 应用设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    // === 网络设置 ===
    /// 显示设备地址
    pub display: DatagramConfig,
    /// 发送间隔（毫秒）
    pub send_interval_ms: u64,
    /// 心跳间隔（毫秒），为空时只在变化时发送
    pub heartbeat_interval_ms: Option<u64>,
    /// 显示端监听地址
    pub listen_addr: String,

    // === 游戏设置 ===
    /// 对局规则
    pub policy: SessionPolicy,
    /// 音效
    pub audio: AudioSettings,
    /// 场景布局文件，为空时使用内置布局
    pub scene_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            display: DatagramConfig::default(),
            send_interval_ms: SEND_INTERVAL_MS,
            heartbeat_interval_ms: None,
            listen_addr: format!("0.0.0.0:{}", DEFAULT_STATUS_PORT),
            policy: SessionPolicy::default(),
            audio: AudioSettings::default(),
            scene_path: None,
        }
    }
}

impl AppSettings {
    /// 获取设置文件路径
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("gem-chase");
            path.push("settings.json");
            path
        })
    }

    /// 从默认位置加载设置
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("无法获取配置目录，使用默认设置");
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("设置文件不存在，使用默认设置");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                tracing::info!("已加载设置: {:?}", path);
                settings
            }
            Err(e) => {
                tracing::warn!("{:#}，使用默认设置", e);
                Self::default()
            }
        }
    }

    /// 从指定文件加载设置
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取设置文件: {:?}", path))?;
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("设置文件格式无效: {:?}", path))?;
        settings
            .policy
            .validate()
            .with_context(|| format!("设置文件中的规则无效: {:?}", path))?;
        Ok(settings)
    }

    /// 保存到默认位置
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::settings_path().context("无法获取配置目录")?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// 保存到指定文件
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self).context("序列化设置失败")?;
        std::fs::write(path, content)
            .with_context(|| format!("写入设置文件失败: {:?}", path))?;

        tracing::info!("设置已保存: {:?}", path);
        Ok(())
    }

    /// 广播器配置
    pub fn broadcaster_config(&self) -> BroadcasterConfig {
        BroadcasterConfig {
            target: self.display.clone(),
            // 0 会让每帧都采样
            send_interval: Duration::from_millis(self.send_interval_ms.max(1)),
            heartbeat: self.heartbeat_interval_ms.map(Duration::from_millis),
        }
    }

    /// 加载场景布局
    pub fn load_layout(&self) -> Result<SceneLayout> {
        let Some(path) = &self.scene_path else {
            return Ok(SceneLayout::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取场景文件: {:?}", path))?;
        SceneLayout::from_json(&content)
            .with_context(|| format!("场景文件格式无效: {:?}", path))
    }
}
