use color_print::ceprintln;

/// Per-line diagnostics go to stderr so the generated stream stays
/// line-aligned with the input.
#[derive(Debug)]
pub enum Msg {
    Error(String),
    Warn(String),
}

impl Msg {
    pub fn report(&self) {
        match self {
            Msg::Error(msg) => ceprintln!("<red,bold>error</>: {}", msg),
            Msg::Warn(msg) => ceprintln!("<yellow,bold>warn</>: {}", msg),
        }
    }

    pub fn diag(&self, file: &str, line: usize, raw: &str) {
        self.report();
        ceprintln!("     <blue>--></> <underline>{}:{}</>", file, line);
        ceprintln!("      <blue>|</>");
        ceprintln!(" <blue>{:>4} |</> {}", line, raw);
        ceprintln!("      <blue>|</>");
    }
}
