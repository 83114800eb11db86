//! Organization and network selection
//!
//! Listing and choosing happen against 1-based display indices, matching what
//! the operator sees on screen. Parsing and filtering are pure functions so
//! the prompt layer stays a thin shell around them.

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use crate::dashboard::{Network, Organization};
use crate::error::{Error, Result};

/// Keep only networks carrying `tag`.
///
/// An empty tag means "no filtering" and returns the input unchanged. The
/// membership test is case-sensitive with no wildcards.
pub fn filter_by_tag(networks: &[Network], tag: &str) -> Vec<Network> {
    if tag.is_empty() {
        return networks.to_vec();
    }

    networks.iter().filter(|n| n.has_tag(tag)).cloned().collect()
}

/// Parse a network selection into zero-based indices.
///
/// Accepts `all` (any case) or a comma-separated list of 1-based indices as
/// displayed. Tokens that are not plain digits are dropped silently; indices
/// outside `1..=count` are an error, as is a selection with nothing left
/// after dropping.
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("all") {
        return Ok((0..count).collect());
    }

    let mut indices = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let display_index: usize = token
            .parse()
            .map_err(|_| Error::selection(format!("index {token} is out of range")))?;
        if display_index == 0 || display_index > count {
            return Err(Error::selection(format!(
                "index {display_index} is out of range (valid: 1-{count})"
            )));
        }

        let index = display_index - 1;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }

    if indices.is_empty() {
        return Err(Error::selection(
            "no valid network numbers in selection".to_string(),
        ));
    }

    Ok(indices)
}

/// Print organizations as a 1-indexed list
pub fn print_organizations(orgs: &[Organization]) {
    println!("\n{}", style("Available Organizations:").bold());
    for (idx, org) in orgs.iter().enumerate() {
        println!("{}: {} (ID: {})", idx + 1, org.name, org.id);
    }
}

/// Print networks as a 1-indexed list, tags included when present
pub fn print_networks(networks: &[Network]) {
    println!("\n{}", style("Available Networks:").bold());
    for (idx, net) in networks.iter().enumerate() {
        if net.tags.is_empty() {
            println!("{}: {} (ID: {})", idx + 1, net.name, net.id);
        } else {
            println!(
                "{}: {} (ID: {}) [{}]",
                idx + 1,
                net.name,
                net.id,
                net.tags.join(", ")
            );
        }
    }
}

/// Display organizations and let the operator pick one by number.
///
/// An out-of-range number aborts the run rather than re-prompting; nothing
/// has been mutated yet.
pub fn choose_organization(orgs: &[Organization]) -> Result<Organization> {
    if orgs.is_empty() {
        return Err(Error::selection(
            "no organizations are visible to this API key",
        ));
    }

    print_organizations(orgs);

    let choice: usize = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an organization by number")
        .interact_text()?;

    if choice == 0 || choice > orgs.len() {
        return Err(Error::selection(format!(
            "organization {choice} is out of range (valid: 1-{})",
            orgs.len()
        )));
    }

    Ok(orgs[choice - 1].clone())
}

/// Display networks and let the operator pick a subset (or `all`)
pub fn choose_networks(networks: &[Network]) -> Result<Vec<Network>> {
    print_networks(networks);

    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Networks to update (\"all\" or comma-separated numbers)")
        .interact_text()?;

    let indices = parse_selection(&raw, networks.len())?;
    Ok(indices.into_iter().map(|i| networks[i].clone()).collect())
}

/// Ask for a tag to filter networks by; empty skips filtering
pub fn prompt_tag_filter() -> Result<String> {
    let tag: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Filter networks by tag (leave empty to skip)")
        .allow_empty(true)
        .interact_text()?;

    Ok(tag.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn network(id: &str, name: &str, tags: &[&str]) -> Network {
        Network {
            id: id.to_string(),
            name: name.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    #[test]
    fn empty_tag_skips_filtering() {
        let networks = vec![
            network("N_1", "HQ", &["prod"]),
            network("N_2", "Lab", &["dev"]),
        ];

        assert_eq!(filter_by_tag(&networks, ""), networks);
    }

    #[test]
    fn tag_filter_is_case_sensitive() {
        let networks = vec![
            network("N_1", "HQ", &["prod"]),
            network("N_2", "Lab", &["dev"]),
            network("N_3", "Depot", &["Prod"]),
        ];

        let filtered = filter_by_tag(&networks, "prod");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "N_1");
    }

    #[test]
    fn all_selects_every_index() {
        assert_eq!(parse_selection("all", 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(parse_selection("  ALL ", 2).unwrap(), vec![0, 1]);
    }

    #[test]
    fn comma_list_maps_to_zero_based() {
        assert_eq!(parse_selection("1,3", 4).unwrap(), vec![0, 2]);
    }

    #[test]
    fn non_numeric_tokens_are_dropped() {
        assert_eq!(parse_selection("2, x, 3,", 4).unwrap(), vec![1, 2]);
    }

    #[test]
    fn duplicates_collapse_preserving_order() {
        assert_eq!(parse_selection("3,3,1", 4).unwrap(), vec![2, 0]);
    }

    #[test]
    fn out_of_range_is_an_error() {
        assert!(matches!(
            parse_selection("0", 3),
            Err(Error::Selection(_))
        ));
        assert!(matches!(
            parse_selection("1,5", 3),
            Err(Error::Selection(_))
        ));
    }

    #[test]
    fn nothing_valid_is_an_error() {
        assert!(parse_selection("", 3).is_err());
        assert!(parse_selection("a, b", 3).is_err());
        assert!(parse_selection(",,", 3).is_err());
    }

    proptest! {
        /// Filter output is a subsequence of the input and every element
        /// carries the tag.
        #[test]
        fn prop_filter_output_subset(tags in proptest::collection::vec("[a-c]{1}", 0..30)) {
            let networks: Vec<Network> = tags
                .iter()
                .enumerate()
                .map(|(i, tag)| network(&format!("N_{i}"), &format!("net-{i}"), &[tag]))
                .collect();

            let filtered = filter_by_tag(&networks, "a");
            prop_assert!(filtered.len() <= networks.len());
            for net in &filtered {
                prop_assert!(net.has_tag("a"));
                prop_assert!(networks.contains(net));
            }
        }

        /// "all" always selects exactly 0..count in order.
        #[test]
        fn prop_all_is_identity(count in 1usize..50) {
            let indices = parse_selection("all", count).unwrap();
            prop_assert_eq!(indices, (0..count).collect::<Vec<_>>());
        }
    }
}
