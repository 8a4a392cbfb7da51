use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;

use crate::{
    disk::BlockId,
    fs::{
        report::{Owner, Segment, Status},
        super_block::SuperBlock,
    },
    shell::Session,
};

pub const CREATE_USAGE: &str = "CREATE <name> <size_bytes>";
pub const WRITE_USAGE: &str = "WRITE <name> <offset> \"<data>\"";
pub const READ_USAGE: &str = "READ <name> <offset> <length>";
pub const DELETE_USAGE: &str = "DELETE <name>";
pub const RESIZE_USAGE: &str = "RESIZE <name> <new_size_bytes>";
pub const DUMP_USAGE: &str = "DUMP <block>";

// DUMP 每行显示的字节数
const DUMP_WIDTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Status,
    Map,
    Check,
    Config,
    Format,
    Exit,
    Create { name: String, size: i64 },
    Write { name: String, offset: i64, data: String },
    Read { name: String, offset: i64, length: i64 },
    Delete(String),
    Resize { name: String, size: i64 },
    Dump(i64),
}

pub fn execute_command(cmd: &Command, session: &mut Session) -> Result<(), Box<dyn Error>> {
    let fs = &mut session.fs;
    match cmd {
        Command::Help => print_help(),
        Command::Create { name, size } => {
            let entry = fs.create(name, *size)?;
            println!(
                "📝 Created {}: {} bytes, {} blocks starting at block {}",
                name.green(),
                entry.size,
                entry.block_count,
                entry.start_block
            );
        }
        Command::Write { name, offset, data } => {
            let max = fs.config().max_write_len;
            if data.len() > max {
                return Err(format!(
                    "Data to write is too long ({} bytes, max {})",
                    data.len(),
                    max
                )
                .into());
            }
            let report = fs.write(name, *offset, data.as_bytes())?;
            if report.is_truncated() {
                println!(
                    "{}",
                    format!(
                        "⚠️  Write past end of file: only {} of {} bytes written",
                        report.written, report.requested
                    )
                    .yellow()
                );
            }
            if report.written == 0 {
                println!("Nothing to write: offset is at the end of the file");
            } else {
                println!(
                    "✏️  Wrote {} bytes to {} at offset {}",
                    report.written,
                    name.cyan(),
                    offset
                );
            }
        }
        Command::Read {
            name,
            offset,
            length,
        } => {
            let report = fs.read(name, *offset, *length)?;
            if report.is_truncated() {
                println!(
                    "{}",
                    format!(
                        "⚠️  Read past end of file: {} of {} bytes read",
                        report.data.len(),
                        report.requested
                    )
                    .yellow()
                );
            }
            if report.data.is_empty() {
                println!("Nothing to read from offset {}", offset);
            } else {
                println!(
                    "📖 Output: \"{}\"",
                    String::from_utf8_lossy(&report.data)
                );
            }
        }
        Command::Delete(name) => {
            let entry = fs.delete(name)?;
            println!(
                "❌ Deleted {}, {} blocks released",
                name.red(),
                entry.block_count
            );
        }
        Command::Resize { name, size } => {
            let entry = fs.resize(name, *size)?;
            println!(
                "🔁 Resized {} to {} bytes ({} blocks starting at block {})",
                name.green(),
                entry.size,
                entry.block_count,
                entry.start_block
            );
        }
        Command::List => {
            println!("{}", "📂 Files:".bright_cyan().bold());
            if fs.table().is_empty() {
                println!("{}", "  (no files)".bright_black());
            }
            for file in fs.list() {
                println!(
                    "  📄 {:<24} {:>8} bytes  {}",
                    file.name,
                    file.size,
                    format!(
                        "blocks {}..{}  {}",
                        file.start_block,
                        file.start_block + file.block_count,
                        file.created.format("%Y-%m-%d %H:%M:%S")
                    )
                    .bright_black()
                );
            }
        }
        Command::Status => {
            let status = fs.status();
            print_status(&status, fs.super_block());
            if session.interactive {
                usage_bar(&status);
            }
        }
        Command::Map => {
            println!("{}", "🧱 Block map:".bright_cyan().bold());
            for segment in fs.block_map() {
                let range = format!(
                    "[{:>6}..{:<6}] {:>6} blocks",
                    segment.start,
                    segment.start + segment.blocks,
                    segment.blocks
                );
                let owner = match &segment.owner {
                    Owner::Free => segment.owner.to_string().bright_black(),
                    Owner::File(_) => segment.owner.to_string().green(),
                    Owner::Orphan => segment.owner.to_string().red().bold(),
                };
                println!("  {}  {}", range, owner);
            }
        }
        Command::Dump(block) => {
            let block = u64::try_from(*block)
                .map_err(|_| format!("Block number must not be negative: {}", block))?;
            let bytes = fs.disk().block(block).ok_or_else(|| {
                format!(
                    "Block {} out of range (medium has {} blocks)",
                    block,
                    fs.geometry().total_blocks
                )
            })?;
            println!(
                "{}",
                format!("🔍 Block {} ({})", block, owner_of(fs.block_map(), block)).bright_cyan()
            );
            for (row, line) in bytes.chunks(DUMP_WIDTH).enumerate() {
                let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
                let ascii: String = line
                    .iter()
                    .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                    .collect();
                println!(
                    "  {:06x}  {:<width$}  {}",
                    row * DUMP_WIDTH,
                    hex.join(" "),
                    ascii.bright_black(),
                    width = DUMP_WIDTH * 3 - 1
                );
            }
        }
        Command::Check => {
            let problems = fs.check();
            if problems.is_empty() {
                println!("{}", "✅ File table and block map are consistent".green());
            }
            for problem in problems {
                println!("{} {}", "⛔".red(), problem.to_string().red());
            }
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(fs.config())?);
        }
        Command::Format => {
            if session.interactive
                && !Confirm::new()
                    .with_prompt("Format the disk? All files will be lost")
                    .default(false)
                    .interact()?
            {
                println!("{}", "Format cancelled".bright_black());
                return Ok(());
            }
            fs.format();
            println!("{}", "💾 Disk formatted successfully!".green());
        }
        Command::Exit => println!("{}", "👋 Exiting BlockFS shell...".yellow().bold()),
    }

    Ok(())
}

fn owner_of(segments: Vec<Segment>, block: BlockId) -> Owner {
    segments
        .into_iter()
        .find(|s| (s.start..s.start + s.blocks).contains(&block))
        .map(|s| s.owner)
        .unwrap_or(Owner::Free)
}

fn print_status(status: &Status, super_block: &SuperBlock) {
    println!("{}", "📊 Storage Status".bright_yellow().bold());
    println!(
        "  {}: {} {} (formatted {})",
        "Volume".blue(),
        super_block.fs_type,
        super_block.volume_id,
        super_block.formatted_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  {}: {} / {} bytes ({:.2}%)",
        "Used".blue(),
        status.used_bytes,
        status.capacity,
        status.percent_used
    );
    println!("  {}: {} bytes", "Free".blue(), status.free_bytes);
    println!(
        "  {}: {} used, {} free of {} (largest free run: {})",
        "Blocks".blue(),
        status.used_blocks,
        status.free_blocks,
        status.total_blocks,
        status.largest_free_run
    );
    println!("  {}: {} / {}", "Files".blue(), status.files, status.max_files);
    if status.unusable_bytes > 0 {
        println!(
            "  {}: {} trailing bytes do not fill a block",
            "Unusable".yellow(),
            status.unusable_bytes
        );
    }
}

// 交互模式下用进度条画出使用率
fn usage_bar(status: &Status) {
    let pb = ProgressBar::new(status.capacity.max(1));
    if let Ok(style) = ProgressStyle::with_template("  [{bar:40.green/black}] {percent:>3}% used") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_position(status.used_bytes);
    pb.abandon();
}

fn print_help() {
    println!("{}", "📘 BlockFS Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  CREATE <name> <size>            Create a file of <size> bytes
  WRITE <name> <offset> \"<data>\"  Write data into a file (never grows it)
  READ <name> <offset> <length>   Read bytes from a file
  DELETE <name>                   Delete a file (alias: RM)
  RESIZE <name> <size>            Recreate a file with a new size (alias: REALLOC)
                                  content is not preserved; if the new size does
                                  not fit, the file is lost
  LIST                            List files (alias: LS)
  STATUS                          Show space usage
  MAP                             Show the block map
  CHECK                           Verify file table against the block map
  DUMP <block>                    Show the raw bytes of one block
  CONFIG                          Print the active configuration
  FORMAT                          Erase everything
  HELP                            Show this help message
  EXIT                            Quit the shell
"
        .bright_black()
    );
}
