use std::sync::mpsc::Sender;

use crate::{
    fs::{FileSystem, FsConfig},
    shell::BootProgress,
};

/// 在后台线程里创建介质并挂载文件表，通过 `tx` 汇报进度
pub fn perform_disk_initialization(config: FsConfig, tx: Sender<BootProgress>) {
    let _ = tx.send(BootProgress::Step("🧠 Checking disk geometry..."));

    if let Err(e) = config.geometry() {
        let _ = tx.send(BootProgress::Finished(Err(Box::new(e))));
        return;
    }
    let _ = tx.send(BootProgress::Progress(30));

    let _ = tx.send(BootProgress::Step("🪶 Allocating disk space..."));
    let fs = match FileSystem::init(config) {
        Ok(fs) => fs,
        Err(e) => {
            let _ = tx.send(BootProgress::Finished(Err(Box::new(e))));
            return;
        }
    };
    let _ = tx.send(BootProgress::Progress(80));

    let _ = tx.send(BootProgress::Step("⚙️  Mounting file table..."));
    let _ = tx.send(BootProgress::Progress(100));
    let _ = tx.send(BootProgress::Finished(Ok(fs)));
}
