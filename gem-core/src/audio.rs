//! 音效提示
//!
//! 控制器只发出“播放某段音效”的请求，实际播放由宿主引擎负责。

use serde::{Deserialize, Serialize};

/// 音效种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// 收集到宝石
    Reward,
    /// 收集完全部宝石
    Win,
    /// 被鸡碰到
    Loss,
}

/// 单个音效配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSettings {
    /// 音效资源名
    pub clip: String,
    /// 音量（0.0-1.0）
    pub volume: f32,
}

impl ClipSettings {
    pub fn new(clip: impl Into<String>, volume: f32) -> Self {
        Self {
            clip: clip.into(),
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

/// 音效配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub reward: ClipSettings,
    pub win: ClipSettings,
    pub loss: ClipSettings,
}

impl AudioSettings {
    /// 获取音效配置
    pub fn clip(&self, cue: AudioCue) -> &ClipSettings {
        match cue {
            AudioCue::Reward => &self.reward,
            AudioCue::Win => &self.win,
            AudioCue::Loss => &self.loss,
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            reward: ClipSettings::new("reward", 1.0),
            win: ClipSettings::new("mixkit-winning-chimes-2015", 1.0),
            loss: ClipSettings::new("losing", 1.0),
        }
    }
}

/// 音效播放端（宿主提供）
pub trait AudioSink {
    /// 播放一次，不关心结果
    fn play_one_shot(&mut self, clip: &str, volume: f32);
}

/// 静音
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play_one_shot(&mut self, _clip: &str, _volume: f32) {}
}

/// 记录播放请求（无音频设备时用于日志和测试）
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    pub played: Vec<(String, f32)>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某音效被播放的次数
    pub fn count(&self, clip: &str) -> usize {
        self.played.iter().filter(|(c, _)| c == clip).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play_one_shot(&mut self, clip: &str, volume: f32) {
        tracing::debug!("播放音效: {}（音量 {:.2}）", clip, volume);
        self.played.push((clip.to_string(), volume));
    }
}

impl<A: AudioSink + ?Sized> AudioSink for Box<A> {
    fn play_one_shot(&mut self, clip: &str, volume: f32) {
        (**self).play_one_shot(clip, volume)
    }
}
