// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 独立采集线程
//!
//! 采集线程只负责取帧并送入有界通道; 追踪/聚合/持久化状态仍由处理循环独占。

use super::{Frame, FrameSource};
use crate::{InspectError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// 通道另一端的帧来源
pub struct ChannelSource {
    rx: Receiver<Result<Frame>>,
}

impl FrameSource for ChannelSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.rx.recv() {
            Ok(Ok(frame)) => Ok(Some(frame)),
            Ok(Err(e)) => Err(e),
            // 采集线程已退出且通道已空
            Err(_) => Ok(None),
        }
    }
}

fn capture_loop<S: FrameSource>(mut source: S, tx: Sender<Result<Frame>>) {
    info!("📷 采集线程启动");
    loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                if tx.send(Ok(frame)).is_err() {
                    debug!("处理循环已退出, 停止采集");
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("❌ 取帧失败: {}", e);
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
    info!("📷 采集线程退出");
}

/// 启动采集线程
///
/// `capacity` 为通道长度, 处理慢于采集时采集线程阻塞等待。
pub fn spawn_capture<S>(source: S, capacity: usize) -> Result<(ChannelSource, JoinHandle<()>)>
where
    S: FrameSource + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
    let handle = thread::Builder::new()
        .name("capture".into())
        .spawn(move || capture_loop(source, tx))
        .map_err(|e| InspectError::io("capture thread", e))?;
    Ok((ChannelSource { rx }, handle))
}
