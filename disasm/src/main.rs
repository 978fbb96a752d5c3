mod msg;

use arch::decode;
use arch::encode;
use arch::label::{LabelDef, SymbolTable};
use color_print::cformat;
use msg::Msg;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.mc")]
    input: String,

    /// Output file
    #[clap(short, long, default_value = "main.s")]
    output: String,

    /// Text segment base address
    #[clap(long, default_value_t = arch::BASE_ADDR, value_parser = parse_addr)]
    base: u32,

    /// Import a label map (YAML)
    #[clap(short, long)]
    labels: Option<String>,
}

fn parse_addr(s: &str) -> Result<u32, String> {
    let addr = encode::parse_int(s)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("bad address: `{s}`"))?;
    // label annotation walks in 4-byte steps from the base
    if addr % 4 != 0 {
        return Err(format!("address is not word-aligned: `{s}`"));
    }
    Ok(addr)
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("M32 Disassembler");

    println!("1. Read File");
    println!("  < {}", &args.input);
    let src = std::fs::read_to_string(&args.input)
        .expect(&cformat!("<r,s>Failed to open file</>: {}", &args.input));

    println!("2. Load Label Map");
    let labels = match &args.labels {
        Some(path) => {
            println!("  < {}", path);
            let yaml = std::fs::read_to_string(path)
                .expect(&cformat!("<r,s>Failed to open file</>: {}", path));
            let defs: Vec<LabelDef> = serde_yaml::from_str(&yaml)
                .expect(&cformat!("<r,s>Failed to parse label map</>: {}", path));
            match SymbolTable::from_defs(&defs) {
                Ok(labels) => labels,
                Err(e) => {
                    Msg::Error(format!("{e} in `{path}`")).report();
                    std::process::exit(1);
                }
            }
        }
        None => SymbolTable::new(),
    };
    println!("  {} label(s)", labels.len());

    println!("3. Decode Words");
    println!("  > {}", &args.output);
    let mut out = String::new();
    let mut pc = args.base;
    let mut failed = 0usize;
    for (idx, raw) in src.lines().enumerate() {
        if let Some(name) = labels.reverse_lookup(pc) {
            out.push_str(name);
            out.push_str(":\n");
        }
        match decode::decode_line(raw, pc, &labels) {
            Ok(line) => {
                out.push_str(&line);
                out.push('\n');
            }
            Err(e) => {
                Msg::Error(e.to_string()).diag(&args.input, idx + 1, raw);
                out.push_str(arch::SENTINEL);
                out.push('\n');
                failed += 1;
            }
        }
        pc += 4;
    }
    std::fs::write(&args.output, &out)
        .expect(&cformat!("<r,s>Failed to write file</>: {}", &args.output));
    if failed > 0 {
        Msg::Warn(format!("{failed} word(s) replaced by a placeholder line")).report();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_address_parsing() {
        assert_eq!(parse_addr("0x00400000"), Ok(0x0040_0000));
        assert_eq!(parse_addr("4194304"), Ok(0x0040_0000));
        assert!(parse_addr("0x00400002").is_err());
        assert!(parse_addr("-4").is_err());
        assert!(parse_addr("main").is_err());
    }
}
