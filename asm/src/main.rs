mod msg;

use arch::encode;
use arch::label::SymbolTable;
use color_print::{cformat, cprintln};
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
    #[clap(default_value = "main.s")]
    input: String,

    /// Output file
    #[clap(short, long, default_value = "main.mc")]
    output: String,

    /// Text segment base address
    #[clap(long, default_value_t = arch::BASE_ADDR, value_parser = parse_addr)]
    base: u32,

    /// Export the label map as YAML
    #[clap(short, long)]
    labels: Option<String>,

    /// Dump the generated listing
    #[clap(short, long)]
    dump: bool,
}

fn parse_addr(s: &str) -> Result<u32, String> {
    let addr = encode::parse_int(s)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("bad address: `{s}`"))?;
    // branch arithmetic assumes a word-aligned text segment
    if addr % 4 != 0 {
        return Err(format!("address is not word-aligned: `{s}`"));
    }
    Ok(addr)
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("M32 Assembler");

    println!("1. Read File");
    println!("  < {}", &args.input);
    let src = std::fs::read_to_string(&args.input)
        .expect(&cformat!("<r,s>Failed to open file</>: {}", &args.input));

    println!("2. Scan Labels");
    let labels = match SymbolTable::scan(&src, args.base) {
        Ok(labels) => labels,
        Err((line, e)) => {
            let raw = src.lines().nth(line - 1).unwrap_or("");
            Msg::Error(e.to_string()).diag(&args.input, line, raw);
            std::process::exit(1);
        }
    };
    println!("  {} label(s)", labels.len());

    if let Some(path) = &args.labels {
        println!("  > {}", path);
        let yaml = serde_yaml::to_string(&labels.defs())
            .expect(&cformat!("<r,s>Failed to serialize label map</>"));
        std::fs::write(path, yaml).expect(&cformat!("<r,s>Failed to write file</>: {}", path));
    }

    println!("3. Generate Binary");
    println!("  > {}", &args.output);
    let mut out = String::new();
    let mut listing: Vec<(u32, String, String)> = vec![];
    let mut pc = args.base;
    let mut failed = 0usize;
    for (idx, raw) in src.lines().enumerate() {
        let shown = encode::strip_comment(raw);
        match encode::encode_line(raw, pc, &labels) {
            Ok(words) => {
                for (nth, word) in words.iter().enumerate() {
                    let text = encode::format_word(*word);
                    out.push_str(&text);
                    out.push('\n');
                    let col = if nth == 0 { shown } else { "" };
                    listing.push((pc + 4 * nth as u32, text, col.to_string()));
                }
                pc += 4 * words.len() as u32;
            }
            Err(e) => {
                Msg::Error(e.to_string()).diag(&args.input, idx + 1, raw);
                let width = encode::line_width(raw);
                for nth in 0..width {
                    out.push_str(arch::SENTINEL);
                    out.push('\n');
                    let col = if nth == 0 { shown } else { "" };
                    listing.push((pc + 4 * nth, arch::SENTINEL.to_string(), col.to_string()));
                }
                pc += 4 * width;
                failed += 1;
            }
        }
    }
    std::fs::write(&args.output, &out)
        .expect(&cformat!("<r,s>Failed to write file</>: {}", &args.output));
    if failed > 0 {
        Msg::Warn(format!("{failed} line(s) replaced by a placeholder word")).report();
    }

    if args.dump {
        println!("------------+----------------------------------+---------------------");
        for (addr, word, src) in &listing {
            cprintln!(" <blue>0x{:08x}</> | {} | {}", addr, word, src);
        }
        println!("------------+----------------------------------+---------------------");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_address_parsing() {
        assert_eq!(parse_addr("0x00400000"), Ok(0x0040_0000));
        assert_eq!(parse_addr("4194304"), Ok(0x0040_0000));
        assert!(parse_addr("0x00400001").is_err());
        assert!(parse_addr("-4").is_err());
        assert!(parse_addr("main").is_err());
    }
}
