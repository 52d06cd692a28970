//! Generators for synthetic prefix-origin files.
//!
//! Each generated prefix is originated by a group of ASBRs, either every
//! combination of a given size or randomly sampled groups. Prefixes come
//! from a reserved /24 block: the first octet encodes the group size plus
//! 100, the second the 1-based group ordinal.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use color_eyre::eyre::{bail, Result};
use ipnet::Ipv4Net;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

/// One originated prefix and the ASBRs announcing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixGroup {
    pub prefix: Ipv4Net,
    pub asbrs: Vec<String>,
}

/// Map `(ordinal, series)` to the prefix `series.ordinal.0.0/24`.
///
/// Both components must fit in an octet and be nonzero, which keeps every
/// generated prefix distinct and outside the well-known low ranges.
pub fn prefix_24(ordinal: usize, series: usize) -> Result<Ipv4Net> {
    if !(1..=255).contains(&ordinal) {
        bail!("prefix ordinal {ordinal} outside 1..=255");
    }
    if !(1..=255).contains(&series) {
        bail!("prefix series {series} outside 1..=255");
    }
    let network = Ipv4Addr::new(series as u8, ordinal as u8, 0, 0);
    Ok(Ipv4Net::new(network, 24)?)
}

/// One group per combination of `group_size` ASBRs, in lexicographic order.
///
/// Fails when the group size does not fit the ASBR set or the number of
/// combinations exceeds the 255 ordinals of the prefix block.
pub fn generate_all_groups(
    asbrs: &BTreeSet<String>,
    group_size: usize,
) -> Result<Vec<PrefixGroup>> {
    if group_size == 0 || group_size > asbrs.len() {
        bail!("group size {group_size} outside 1..={}", asbrs.len());
    }
    let series = group_size + 100;

    let mut groups = Vec::new();
    for (index, combination) in asbrs.iter().combinations(group_size).enumerate() {
        if index >= 255 {
            bail!("more than 255 ASBR combinations, prefix space exhausted");
        }
        groups.push(PrefixGroup {
            prefix: prefix_24(index + 1, series)?,
            asbrs: combination.into_iter().cloned().collect(),
        });
    }
    Ok(groups)
}

/// `count` groups of `group_size` ASBRs sampled without replacement.
pub fn generate_random_groups(
    asbrs: &BTreeSet<String>,
    count: usize,
    group_size: usize,
    rng: &mut impl Rng,
) -> Result<Vec<PrefixGroup>> {
    if group_size == 0 || group_size > asbrs.len() {
        bail!("group size {group_size} outside 1..={}", asbrs.len());
    }
    if count == 0 || count > 255 {
        bail!("group count {count} outside 1..=255");
    }
    let series = group_size + 100;
    let pool: Vec<String> = asbrs.iter().cloned().collect();

    let mut groups = Vec::with_capacity(count);
    for ordinal in 1..=count {
        groups.push(PrefixGroup {
            prefix: prefix_24(ordinal, series)?,
            asbrs: pool.choose_multiple(rng, group_size).cloned().collect(),
        });
    }
    Ok(groups)
}
