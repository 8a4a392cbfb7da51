pub mod command;
pub mod parse;

use crate::{
    disk::init::perform_disk_initialization,
    fs::{FileSystem, FsConfig},
    shell::{
        command::{execute_command, Command},
        parse::parse_command,
    },
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use reedline::{DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::{
    error::Error,
    io::stdout,
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

const COMMANDS: [&str; 16] = [
    "create", "write", "read", "delete", "rm", "resize", "list", "ls", "status", "map", "check",
    "dump", "config", "format", "help", "exit",
];

/// 启动线程向 shell 汇报的进度
#[derive(Debug)]
pub enum BootProgress {
    Step(&'static str),
    Progress(u64),
    Finished(Result<FileSystem, Box<dyn Error + Send + Sync>>),
}

/// 一次会话：存储句柄 + 是否有人在终端前
#[derive(Debug)]
pub struct Session {
    pub fs: FileSystem,
    pub interactive: bool,
}

pub fn start_shell(config: FsConfig) -> Result<(), Box<dyn Error>> {
    let fs = boot(config).map_err(|e| e as Box<dyn Error>)?;
    let mut session = Session {
        fs,
        interactive: true,
    };

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".blockfs_history");

    let mut line_editor = Reedline::create();
    match FileBackedHistory::with_file(100, history_path) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => log::warn!("command history disabled: {}", e),
    }

    // 命令补全
    let completer =
        DefaultCompleter::new_with_wordlen(COMMANDS.iter().map(|c| c.to_string()).collect(), 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(format!(
            "{}@{}",
            username.green().bold(),
            hostname.cyan().bold()
        )),
        DefaultPromptSegment::Basic("BlockFS".bright_blue().bold().to_string()),
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if !handle_line(trimmed, &mut session) {
                    println!("{}", "👋 Bye!".bright_yellow());
                    break;
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting BlockFS...".yellow());
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
    Ok(())
}

/// 批处理：逐行执行脚本，跳过空行和以 `#` 开头的注释
pub fn run_script(config: FsConfig, path: &Path) -> Result<(), Box<dyn Error>> {
    let script = std::fs::read_to_string(path)?;
    let mut session = Session {
        fs: FileSystem::init(config)?,
        interactive: false,
    };
    log::info!("running script {}", path.display());

    for line in script.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        println!("{} {}", ">".bright_black(), line);
        if !handle_line(line, &mut session) {
            break;
        }
    }
    Ok(())
}

/// 解析并执行一行命令，返回 false 表示会话结束
pub fn handle_line(line: &str, session: &mut Session) -> bool {
    match parse_command(line) {
        Ok(cmd) => {
            if let Err(e) = execute_command(&cmd, session) {
                println!("{} {}", "❌ Error:".red().bold(), e);
            }
            !matches!(cmd, Command::Exit)
        }
        Err(e) => {
            println!("{}", format!("⚠️  {}", e).yellow());
            true
        }
    }
}

/// 启动画面：后台线程初始化磁盘，前台用进度条展示
fn boot(config: FsConfig) -> Result<FileSystem, Box<dyn Error + Send + Sync>> {
    let mut stdout = stdout();

    execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    println!("{}", "[BlockFS Booting...]".bright_yellow().bold());

    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }

    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || perform_disk_initialization(config, tx));

    let mut result: Result<FileSystem, Box<dyn Error + Send + Sync>> =
        Err("disk initialization ended without a result".into());
    for event in rx {
        match event {
            BootProgress::Step(step) => pb.set_message(step),
            BootProgress::Progress(pos) => pb.set_position(pos),
            BootProgress::Finished(outcome) => {
                result = outcome;
                break;
            }
        }
    }
    let _ = worker.join();

    let fs = match result {
        Ok(fs) => fs,
        Err(e) => {
            pb.abandon_with_message("❌ Boot failed");
            return Err(e);
        }
    };
    pb.finish_with_message("✅ Ready!");

    execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(format!("Welcome to BlockFS v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    )?;
    let geometry = fs.geometry();
    println!(
        "{}",
        format!(
            "{} volume {}: {} blocks × {} bytes, {} file slots",
            fs.super_block().fs_type,
            fs.super_block().volume_id,
            geometry.total_blocks,
            geometry.block_size,
            fs.config().max_files
        )
        .bright_black()
    );
    Ok(fs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            fs: FileSystem::init(FsConfig::default()).unwrap(),
            interactive: false,
        }
    }

    #[test]
    fn exit_ends_the_session() {
        let mut session = session();
        assert!(handle_line("create a 10", &mut session));
        assert!(handle_line("bogus", &mut session));
        assert!(handle_line("read ghost 0 1", &mut session));
        assert!(!handle_line("EXIT", &mut session));
        assert_eq!(session.fs.list().len(), 1);
    }

    #[test]
    fn script_runs_every_command() {
        let path = std::env::temp_dir().join(format!("blockfs-script-{}.txt", std::process::id()));
        std::fs::write(
            &path,
            "# demo\nCREATE a 600\n\nWRITE a 0 \"hello\"\nREAD a 0 5\nexit\nCREATE b 1\n",
        )
        .unwrap();
        let result = run_script(FsConfig::default(), &path);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn missing_script_is_an_error() {
        let path = std::env::temp_dir().join("blockfs-no-such-script.txt");
        assert!(run_script(FsConfig::default(), &path).is_err());
    }
}
