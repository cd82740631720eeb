use crate::assembler::{self, disasm, serialize::Serializer};
use crate::assets;
use crate::isa::hw::{Byte, ByteOrder, WORD_BYTES};
use ansi_term::Colour::Red;
use anyhow::{Context, Result};
use log::{info, LevelFilter};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[cfg(windows)]
pub fn terminal_init() {
    // Without ANSI support the diagnostics are merely uncoloured.
    let _ = ansi_term::enable_ansi_support();
}

#[cfg(not(windows))]
pub fn terminal_init() {}

/// Logs go to stderr. `RUST_LOG` overrides the level picked by `-v`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    let _ = builder.try_init();
}

#[derive(StructOpt, Debug)]
#[structopt(name = "rvasm")]
pub enum CommandRoot {
    /// Assemble a source file into a word stream binary
    Asm(SubcommandAsm),
    /// Print the instructions in a word stream binary
    Dis(SubcommandDis),
}

#[derive(StructOpt, Debug)]
pub struct CommonOpts {
    /// Byte order of the words in the binary: little, big or native
    #[structopt(short, long, name = "byte-order", default_value = "little")]
    pub byte_order: ByteOrder,

    /// Log more (-v info, -vv debug, -vvv trace) and show the failing source line
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

#[derive(StructOpt, Debug)]
#[structopt(name = "rvasm-asm")]
pub struct SubcommandAsm {
    #[structopt(flatten)]
    pub opts: CommonOpts,

    #[structopt(name = "in.rva", parse(from_os_str))]
    pub in_src: PathBuf,

    #[structopt(name = "out.rvb", parse(from_os_str))]
    pub out_bin: Option<PathBuf>,
}

impl SubcommandAsm {
    pub fn out_path(&self) -> PathBuf {
        self.out_bin
            .clone()
            .unwrap_or_else(|| default_out_path(&self.in_src))
    }

    pub fn run(&self) -> Result<usize> {
        assemble_to_path(&self.in_src, &self.out_path(), self.opts.byte_order)
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "rvdis")]
pub struct SubcommandDis {
    #[structopt(flatten)]
    pub opts: CommonOpts,

    #[structopt(name = "in.rvb", parse(from_os_str))]
    pub in_bin: PathBuf,
}

impl SubcommandDis {
    /// One line per instruction, with its word address as a trailing comment.
    pub fn listing(&self) -> Result<Vec<String>> {
        Ok(disassemble_path(&self.in_bin, self.opts.byte_order)?
            .iter()
            .map(|inst| format!("{:<24}# {}", inst.to_string(), inst.addr))
            .collect())
    }
}

/// The output path used when none is given: the input's file name with the binary extension,
/// in the current directory.
pub fn default_out_path(in_src: &Path) -> PathBuf {
    let stem = in_src
        .file_stem()
        .map_or_else(|| PathBuf::from("out"), PathBuf::from);
    stem.with_extension(assets::DEFAULT_BINARY_EXT)
}

pub fn assemble_path(path: &Path, order: ByteOrder) -> Result<Vec<Byte>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("could not read '{}'", path.display()))?;

    let words = assembler::assemble(&source).map_err(|err| {
        let excerpt = source_excerpt(&source, path, &err);
        anyhow::Error::new(err).context(excerpt)
    })?;

    let mut bytes = Vec::with_capacity(words.len() * WORD_BYTES);
    Serializer::new(order).write(&words, &mut bytes)?;
    Ok(bytes)
}

/// Nothing is written unless the whole program assembles.
pub fn assemble_to_path(in_src: &Path, out_bin: &Path, order: ByteOrder) -> Result<usize> {
    let bytes = assemble_path(in_src, order)?;

    std::fs::write(out_bin, &bytes)
        .with_context(|| format!("could not write '{}'", out_bin.display()))?;

    info!(
        "wrote {} byte(s) to '{}' ({} endian)",
        bytes.len(),
        out_bin.display(),
        order.resolve()
    );
    Ok(bytes.len())
}

pub fn disassemble_path(path: &Path, order: ByteOrder) -> Result<Vec<disasm::DisassembledInst>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("could not read '{}'", path.display()))?;

    disasm::disassemble_bytes(&bytes, order)
        .with_context(|| format!("could not disassemble '{}'", path.display()))
}

fn source_excerpt(source: &str, path: &Path, err: &assembler::Error) -> String {
    let loc = err.loc();
    let text = source.lines().nth(loc.line() - 1).unwrap_or_default();

    format!(
        "{}:{}:{}\n{:>5} | {}\n      | {:>width$}",
        path.display(),
        loc.line(),
        loc.col(),
        loc.line(),
        text,
        "^",
        width = loc.col()
    )
}

/// The text printed for a failed command. The first line is always `error: ‹message›`;
/// `verbose` adds the source excerpt for assembly errors.
pub fn diagnostic(err: &anyhow::Error, verbose: u8, colour: bool) -> String {
    let prefix = if colour {
        Red.bold().paint("error:").to_string()
    } else {
        String::from("error:")
    };

    match err.downcast_ref::<assembler::Error>() {
        Some(asm_err) if verbose > 0 => format!("{} {}\n{}", prefix, asm_err, err),
        Some(asm_err) => format!("{} {}", prefix, asm_err),
        None => format!("{} {:#}", prefix, err),
    }
}

fn report(err: &anyhow::Error, verbose: u8) -> ! {
    eprintln!(
        "{}",
        diagnostic(err, verbose, std::io::stderr().is_terminal())
    );
    std::process::exit(1);
}

pub fn root(cmd: CommandRoot) -> ! {
    match cmd {
        CommandRoot::Asm(scmd) => asm(scmd),
        CommandRoot::Dis(scmd) => dis(scmd),
    }
}

pub fn asm(cmd: SubcommandAsm) -> ! {
    init_logging(cmd.opts.verbose);

    match cmd.run() {
        Ok(_) => std::process::exit(0),
        Err(err) => report(&err, cmd.opts.verbose),
    }
}

pub fn dis(cmd: SubcommandDis) -> ! {
    init_logging(cmd.opts.verbose);

    match cmd.listing() {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            std::process::exit(0)
        }
        Err(err) => report(&err, cmd.opts.verbose),
    }
}
