//! Argument normalisation ahead of clap.

/// Rewrite `-f <flag>` so the flag is parsed as a flag.
///
/// When the token after `-f` (or the value glued to it, as in `-f-v`) starts
/// with `-`, the `-f` is dropped: the description file keeps its default and
/// the token is handed to clap on its own. A token that is not one of the
/// `-v`, `-n` or `-h` switches is dropped as well.
///
/// ```
/// use mymake::cli::normalise_args;
///
/// let args = ["mymake", "-f", "-v", "app"].map(String::from);
/// assert_eq!(normalise_args(&args), ["mymake", "-v", "app"]);
/// ```
#[must_use]
pub fn normalise_args(args: &[String]) -> Vec<String> {
    let mut normalised = Vec::with_capacity(args.len());
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        let flag = if arg == "-f" {
            iter.next_if(|next| next.starts_with('-')).map(String::as_str)
        } else {
            arg.strip_prefix("-f").filter(|rest| rest.starts_with('-'))
        };
        match flag {
            Some(flag) if is_switch(flag) => normalised.push(flag.to_owned()),
            Some(_) => {}
            None => normalised.push(arg.clone()),
        }
    }
    normalised
}

fn is_switch(token: &str) -> bool {
    if matches!(token, "--verbose" | "--dry-run") {
        return true;
    }
    token.strip_prefix('-').is_some_and(|cluster| {
        !cluster.is_empty() && cluster.chars().all(|c| matches!(c, 'v' | 'n' | 'h'))
    })
}
