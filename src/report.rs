use console::style;

/// Prints an error and its causes to stderr. Returns the value on success.
pub fn print_err<T>(res: anyhow::Result<T>) -> Option<T> {
    match res {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            e.chain()
                .skip(1)
                .for_each(|cause| eprintln!(" {} {}", style("caused by:").bold(), cause));
            None
        }
    }
}

/// Progress line on stdout, e.g. `[1/3] Reading lab.md`.
pub fn step(current: usize, total: usize, label: &str, detail: &str) {
    println!(
        "{} {} {}",
        style(format!("[{}/{}]", current, total)).dim(),
        style(label).bold(),
        detail
    );
}
