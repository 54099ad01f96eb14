//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次导入的调度和统计，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量导入处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载导出、构造筛选条件
//! - 顺序驱动 workflow 的筛选、查询、组装
//! - 输出全局统计信息
//!
//! ### `submission` - 卡片提交
//! - 把卡片交给卡片库，统计成功数量
//! - 试运行时只记录卡片内容
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<RawHighlight>)
//!     ↓
//! workflow (selector → HighlightFlow → NoteBuilder)
//!     ↓
//! services (能力层：dictionary / audio / anki)
//!     ↓
//! infrastructure (基础设施：HttpExecutor)
//! ```

pub mod batch_processor;
pub mod submission;

// 重新导出主要类型
pub use batch_processor::{build_criteria, run_pipeline, App, BatchReport};
pub use submission::submit;
