//! # Highlight Import
//!
//! 把阅读器导出的高亮变成带释义和发音的记忆卡片
//!
//! ## 架构设计
//!
//! 数据只向前流动：导出 → 筛选 → 查询 → 组装 → 提交
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 连接池），只暴露能力
//! - `HttpExecutor` - 唯一的 Client owner，提供 get / post 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个单词或一批卡片
//! - `DictionaryLookup` - 查词能力（`HttpDictionary`）
//! - `AudioLookup` - 发音能力（Forvo / 自定义 URL）
//! - `NoteSink` - 插入卡片能力（`AnkiConnect`）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条高亮"如何变成一张卡片
//! - `select` - 按日期和书名筛选
//! - `HighlightFlow` - 查询流程（去标点 → 加粗 → 查词 → 查发音）
//! - `NoteBuilder` - 卡片组装（字段 / 标签 / 音频附件）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 一次导入的完整调度和统计
//! - `orchestrator/submission` - 提交卡片并汇总结果
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::HttpExecutor;
pub use models::{FilterCriteria, FlashcardPayload, RawHighlight, ResolvedEntry};
pub use orchestrator::{run_pipeline, App, BatchReport};
pub use workflow::{HighlightFlow, NoteBuilder, NoteTemplate, ResolveOptions};
