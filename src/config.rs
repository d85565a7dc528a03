// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 命令行参数

use clap::Parser;
use std::path::PathBuf;

/// 瓶子质检参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "瓶子质检 - 产线瓶子缺陷检测与记录", long_about = None)]
pub struct Args {
    /// 检测回放文件 (JSON Lines)
    #[arg(short, long)]
    pub detections: PathBuf,

    /// 帧图片目录 (不指定时使用空白帧)
    #[arg(short, long)]
    pub frames: Option<PathBuf>,

    /// 参数配置文件 (不存在时以默认值创建)
    #[arg(short, long, default_value = "inspector.json")]
    pub config: PathBuf,

    /// CSV日志路径 (覆盖配置文件)
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// 截图目录 (覆盖配置文件)
    #[arg(long)]
    pub snapshots: Option<PathBuf>,

    /// 模拟时钟帧率, 每帧推进 1/FPS 秒 (不指定时使用系统时钟)
    #[arg(long)]
    pub replay_fps: Option<f64>,

    /// 空白帧宽度
    #[arg(long, default_value_t = 2650)]
    pub frame_width: u32,

    /// 空白帧高度
    #[arg(long, default_value_t = 1600)]
    pub frame_height: u32,

    /// 状态面板字体 (TTF/OTF)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// 使用独立采集线程
    #[arg(long, default_value_t = false)]
    pub threaded: bool,

    /// 演练模式: 不写文件
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// 日志级别 (RUST_LOG 优先)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["inspector", "--detections", "d.jsonl"]);
        assert_eq!(args.detections, PathBuf::from("d.jsonl"));
        assert_eq!(args.config, PathBuf::from("inspector.json"));
        assert_eq!((args.frame_width, args.frame_height), (2650, 1600));
        assert!(args.replay_fps.is_none());
        assert!(!args.threaded && !args.dry_run);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "inspector",
            "-d",
            "d.jsonl",
            "-f",
            "frames",
            "--csv",
            "out/log.csv",
            "--replay-fps",
            "30",
            "--threaded",
        ]);
        assert_eq!(args.frames, Some(PathBuf::from("frames")));
        assert_eq!(args.csv, Some(PathBuf::from("out/log.csv")));
        assert_eq!(args.replay_fps, Some(30.0));
        assert!(args.threaded);
    }
}
