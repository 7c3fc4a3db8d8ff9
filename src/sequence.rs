use lazy_static::lazy_static;
use regex::Regex;

/// Below this length the Wallace rule is used for Tm.
const WALLACE_MAX_LENGTH: usize = 14;

lazy_static! {
    static ref ACGT_ONLY: Regex = Regex::new("^[ATCG]+$").expect("valid nucleotide pattern");
}

/// Upper-cases. Whitespace is kept so the alphabet check can reject it.
pub fn normalize(sequence: &str) -> String {
    sequence.to_ascii_uppercase()
}

/// True if the (already normalized) sequence is non-empty and only contains A, T, C, G.
pub fn is_acgt(sequence: &str) -> bool {
    ACGT_ONLY.is_match(sequence)
}

#[inline(always)]
fn count_bases(sequence: &str, bases: &[u8]) -> usize {
    sequence
        .bytes()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| bases.contains(c))
        .count()
}

pub fn gc_count(sequence: &str) -> usize {
    count_bases(sequence, b"GC")
}

pub fn at_count(sequence: &str) -> usize {
    count_bases(sequence, b"AT")
}

/// GC content in percent. An empty sequence has 0% GC.
pub fn gc_percent(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    100.0 * gc_count(sequence) as f64 / sequence.len() as f64
}

/// Melting temperature in °C.
///
/// Short oligos use the Wallace rule `2(A+T) + 4(G+C)`; from 14 nt on the
/// salt-adjusted approximation `64.9 + 41(GC - 16.4) / N` is used.
pub fn melting_temp(sequence: &str) -> f64 {
    let len = sequence.len();
    let gc = gc_count(sequence) as f64;
    if len < WALLACE_MAX_LENGTH {
        2.0 * at_count(sequence) as f64 + 4.0 * gc
    } else {
        64.9 + 41.0 * (gc - 16.4) / len as f64
    }
}
