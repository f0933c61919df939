use crate::{error::InstallerError, prompt::Prompter};

/// Numbered menu over `items` with `/query` search.
///
/// A search that matches narrows the pool, and later searches narrow it
/// further. A search that matches nothing leaves the pool as it was.
pub fn choose<P: Prompter + ?Sized>(
    p: &mut P,
    prompt: &str,
    items: &[String],
) -> Result<String, InstallerError> {
    let mut pool: Vec<&String> = items.iter().collect();

    loop {
        for (i, item) in pool.iter().enumerate() {
            p.say(&format!("{}) {}", i + 1, item));
        }

        let answer = p.read_line(&format!("{} (1-{} or /search)", prompt, pool.len()))?;

        if let Some(query) = answer.strip_prefix('/') {
            let query = query.to_lowercase();
            let matches: Vec<&String> = pool
                .iter()
                .copied()
                .filter(|item| item.to_lowercase().contains(&query))
                .collect();

            if matches.is_empty() {
                p.say("No matches found");
            } else {
                pool = matches;
            }
            continue;
        }

        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=pool.len()).contains(&n) => return Ok(pool[n - 1].clone()),
            Ok(_) => p.say(&format!(
                "Please choose a number between 1 and {}",
                pool.len()
            )),
            Err(_) => p.say("Invalid input, please enter a number or a search query"),
        }
    }
}
