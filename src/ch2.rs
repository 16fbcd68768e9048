use crate::{ch1::alphabet::check_dna, Error, Result};
use rand::Rng;

/// Checks that `dna` is a non-empty collection of nucleotide strands, each at least `k` long,
/// and, for the profile-based searches, that all strands share one length.
fn check_strands<S: AsRef<[u8]>>(dna: &[S], k: usize, equal_length: bool) -> Result<()> {
    if dna.is_empty() {
        return Err(Error::InvalidInput("no strands given".to_owned()));
    }
    if k == 0 {
        return Err(Error::InvalidInput("k must be positive".to_owned()));
    }
    let expected = dna[0].as_ref().len();
    for (index, strand) in dna.iter().enumerate() {
        let strand = strand.as_ref();
        if equal_length && strand.len() != expected {
            return Err(Error::UnequalStrandLength {
                index,
                expected,
                found: strand.len(),
            });
        }
        if strand.len() < k {
            return Err(Error::InvalidInput(format!(
                "strand {} has length {}, shorter than k = {}",
                index,
                strand.len(),
                k
            )));
        }
        check_dna(strand)?;
    }
    Ok(())
}

/// Picks one k-mer per strand, each starting at an independent uniformly random offset.
fn random_motifs<'a, R: Rng>(strands: &[&'a [u8]], k: usize, rng: &mut R) -> Vec<&'a [u8]> {
    strands
        .iter()
        .map(|strand| {
            let start = rng.gen_range(0..=strand.len() - k);
            &strand[start..start + k]
        })
        .collect()
}

pub mod enumeration {
    use super::check_strands;
    use crate::{
        ch1::{
            alphabet::Alphabet,
            codec::{number_to_pattern, pattern_space, pattern_to_number, MAX_DENSE_K},
            mismatches::neighbors_unchecked,
        },
        Error, Result,
    };
    use bitvec::prelude::*;
    use log::debug;
    use std::collections::HashSet;

    /// Finds every k-mer that occurs, with at most `max_distance` mismatches, in every strand.
    /// Each strand contributes the union of the Hamming neighborhoods of its windows; the
    /// result is the intersection of those unions, sorted lexicographically.
    pub fn motif_enumeration<S: AsRef<[u8]>>(
        dna: &[S],
        k: usize,
        max_distance: usize,
    ) -> Result<Vec<Vec<u8>>> {
        check_strands(dna, k, false)?;
        let motifs = if k <= MAX_DENSE_K {
            enumerate_dense(dna, k, max_distance)?
        } else {
            enumerate_sparse(dna, k, max_distance)
        };
        debug!(
            "found {} ({}, {})-motifs shared by {} strands",
            motifs.len(),
            k,
            max_distance,
            dna.len()
        );
        Ok(motifs)
    }

    /// One bit per possible k-mer, indexed by its integer encoding.
    fn enumerate_dense<S: AsRef<[u8]>>(
        dna: &[S],
        k: usize,
        max_distance: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let size = pattern_space(Alphabet::DNA.len(), k)
            .ok_or_else(|| Error::InvalidInput(format!("4^{} does not fit in memory", k)))?;
        let mut shared: Option<BitVec> = None;
        for strand in dna {
            let mut seen = bitvec![0; size];
            for kmer in strand.as_ref().windows(k) {
                for neighbor in neighbors_unchecked(kmer, &Alphabet::DNA, max_distance) {
                    seen.set(pattern_to_number(&neighbor)? as usize, true);
                }
            }
            let acc = match shared {
                Some(mut acc) => {
                    acc &= seen.as_bitslice();
                    acc
                }
                None => seen,
            };
            if acc.not_any() {
                return Ok(Vec::new());
            }
            shared = Some(acc);
        }
        match shared {
            Some(acc) => acc
                .iter_ones()
                .map(|number| number_to_pattern(number as u64, k))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    fn enumerate_sparse<S: AsRef<[u8]>>(dna: &[S], k: usize, max_distance: usize) -> Vec<Vec<u8>> {
        let mut shared: Option<HashSet<Vec<u8>>> = None;
        for strand in dna {
            let mut seen = HashSet::new();
            for kmer in strand.as_ref().windows(k) {
                seen.extend(neighbors_unchecked(kmer, &Alphabet::DNA, max_distance));
            }
            let acc = match shared {
                Some(mut acc) => {
                    acc.retain(|motif| seen.contains(motif));
                    acc
                }
                None => seen,
            };
            if acc.is_empty() {
                return Vec::new();
            }
            shared = Some(acc);
        }
        let mut motifs: Vec<Vec<u8>> = shared.unwrap_or_default().into_iter().collect();
        motifs.sort_unstable();
        motifs
    }

}

pub mod median {
    use super::check_strands;
    use crate::{
        ch1::{
            alphabet::{check_dna, Alphabet},
            codec::{number_to_pattern, pattern_space},
            mismatches::dist,
        },
        Error, Result,
    };
    use log::debug;
    use std::cmp::Ordering;

    /// Smallest Hamming distance between `pattern` and any window of `strand`.
    pub(crate) fn min_distance(pattern: &[u8], strand: &[u8]) -> usize {
        strand
            .windows(pattern.len())
            .map(|kmer| dist(pattern, kmer))
            .min()
            .unwrap_or(pattern.len())
    }

    pub(crate) fn total_distance(pattern: &[u8], strands: &[&[u8]]) -> usize {
        strands
            .iter()
            .map(|strand| min_distance(pattern, strand))
            .sum()
    }

    /// Sum over strands of the distance from `pattern` to its best match in the strand.
    pub fn distance_between_pattern_and_strands<S: AsRef<[u8]>, P: AsRef<[u8]>>(
        dna: &[S],
        pattern: P,
    ) -> Result<usize> {
        let pattern = pattern.as_ref();
        check_strands(dna, pattern.len(), false)?;
        check_dna(pattern)?;
        Ok(dna
            .iter()
            .map(|strand| min_distance(pattern, strand.as_ref()))
            .sum())
    }

    /// Like `distance_between_pattern_and_strands`, but pattern `i` is matched against strand
    /// `i` only.
    pub fn distance_between_patterns_and_strands<S: AsRef<[u8]>, P: AsRef<[u8]>>(
        dna: &[S],
        patterns: &[P],
    ) -> Result<usize> {
        if patterns.len() != dna.len() {
            return Err(Error::InvalidInput(format!(
                "{} patterns for {} strands",
                patterns.len(),
                dna.len()
            )));
        }
        let k = patterns.first().map_or(0, |p| p.as_ref().len());
        check_strands(dna, k, false)?;
        let mut total = 0;
        for (pattern, strand) in patterns.iter().zip(dna) {
            let pattern = pattern.as_ref();
            if pattern.len() != k {
                return Err(Error::LengthMismatch {
                    left: k,
                    right: pattern.len(),
                });
            }
            check_dna(pattern)?;
            total += min_distance(pattern, strand.as_ref());
        }
        Ok(total)
    }

    /// Best distance so far and the encodings of every candidate achieving it, in scan order.
    type Ties = (usize, Vec<usize>);

    fn keep_ties(mut best: Ties, distance: usize, number: usize) -> Ties {
        match distance.cmp(&best.0) {
            Ordering::Less => {
                best.0 = distance;
                best.1.clear();
                best.1.push(number);
            }
            Ordering::Equal => best.1.push(number),
            Ordering::Greater => (),
        }
        best
    }

    #[cfg(feature = "parallel")]
    fn merge_ties(left: Ties, right: Ties) -> Ties {
        match left.0.cmp(&right.0) {
            Ordering::Less => left,
            Ordering::Greater => right,
            Ordering::Equal => {
                let mut merged = left;
                merged.1.extend(right.1);
                merged
            }
        }
    }

    fn candidate_distance(number: usize, k: usize, strands: &[&[u8]]) -> Result<usize> {
        let pattern = number_to_pattern(number as u64, k)?;
        Ok(total_distance(&pattern, strands))
    }

    /// Brute-force search over all `4^k` k-mers for those minimizing
    /// `distance_between_pattern_and_strands`. Every tied k-mer is returned, in lexicographic
    /// order.
    pub fn median_string<S: AsRef<[u8]>>(dna: &[S], k: usize) -> Result<Vec<Vec<u8>>> {
        check_strands(dna, k, false)?;
        let candidates = pattern_space(Alphabet::DNA.len(), k).ok_or_else(|| {
            Error::InvalidInput(format!("4^{} candidates cannot be enumerated", k))
        })?;
        let strands: Vec<&[u8]> = dna.iter().map(|strand| strand.as_ref()).collect();

        #[cfg(feature = "parallel")]
        let (distance, mut numbers) = {
            use rayon::prelude::*;
            (0..candidates)
                .into_par_iter()
                .map(|number| candidate_distance(number, k, &strands).map(|d| (d, number)))
                .try_fold(
                    || (usize::MAX, Vec::new()),
                    |best, item| item.map(|(d, number)| keep_ties(best, d, number)),
                )
                .try_reduce(|| (usize::MAX, Vec::new()), |a, b| Ok(merge_ties(a, b)))?
        };
        #[cfg(not(feature = "parallel"))]
        let (distance, mut numbers) = {
            let mut best: Ties = (usize::MAX, Vec::new());
            for number in 0..candidates {
                best = keep_ties(best, candidate_distance(number, k, &strands)?, number);
            }
            best
        };

        numbers.sort_unstable();
        debug!(
            "{} median strings of length {} at total distance {}",
            numbers.len(),
            k,
            distance
        );
        numbers
            .into_iter()
            .map(|number| number_to_pattern(number as u64, k))
            .collect()
    }

}

pub mod profile {
    use crate::{
        ch1::{alphabet::Alphabet, mismatches::hamming_distance},
        Error, Result,
    };

    const NUCS: [u8; 4] = [b'A', b'C', b'G', b'T'];

    fn nuc_to_row(nuc: u8, position: usize) -> Result<usize> {
        Alphabet::DNA.rank(nuc).ok_or(Error::InvalidSymbol {
            symbol: nuc as char,
            position,
        })
    }

    /// Per-column nucleotide counts of a collection of equal-length motifs. Motifs can be added
    /// and removed one at a time.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Counts {
        k: usize,
        n: usize,
        counts: Vec<Vec<usize>>,
    }

    impl Counts {
        pub fn empty(k: usize) -> Self {
            Self {
                k,
                n: 0,
                counts: vec![vec![0; k]; 4],
            }
        }

        pub fn new<M: AsRef<[u8]>>(motifs: &[M]) -> Result<Self> {
            let first = motifs
                .first()
                .ok_or_else(|| Error::InvalidInput("no motifs given".to_owned()))?;
            let mut counts = Self::empty(first.as_ref().len());
            for motif in motifs {
                counts.add(motif.as_ref())?;
            }
            Ok(counts)
        }

        pub fn k(&self) -> usize {
            self.k
        }

        /// Number of motifs counted.
        pub fn n(&self) -> usize {
            self.n
        }

        pub fn add(&mut self, motif: &[u8]) -> Result<()> {
            self.check(motif)?;
            for (i, nuc) in motif.iter().enumerate() {
                let row = nuc_to_row(*nuc, i)?;
                self.counts[row][i] += 1;
            }
            self.n += 1;
            Ok(())
        }

        /// Removes a motif previously added. Fails without modifying the counts if `motif` was
        /// never counted.
        pub fn remove(&mut self, motif: &[u8]) -> Result<()> {
            self.check(motif)?;
            let rows = motif
                .iter()
                .enumerate()
                .map(|(i, nuc)| nuc_to_row(*nuc, i))
                .collect::<Result<Vec<_>>>()?;
            if self.n == 0 || rows.iter().enumerate().any(|(i, row)| self.counts[*row][i] == 0) {
                return Err(Error::InvalidInput(format!(
                    "{} was not counted",
                    String::from_utf8_lossy(motif)
                )));
            }
            for (i, row) in rows.into_iter().enumerate() {
                self.counts[row][i] -= 1;
            }
            self.n -= 1;
            Ok(())
        }

        fn check(&self, motif: &[u8]) -> Result<()> {
            if motif.len() != self.k {
                return Err(Error::LengthMismatch {
                    left: self.k,
                    right: motif.len(),
                });
            }
            Ok(())
        }

        /// Most common nucleotide of each column; ties go to the first in `ACGT` order.
        pub fn consensus(&self) -> Vec<u8> {
            (0..self.k)
                .map(|i| {
                    let mut best = 0;
                    for row in 1..4 {
                        if self.counts[row][i] > self.counts[best][i] {
                            best = row;
                        }
                    }
                    NUCS[best]
                })
                .collect()
        }

        /// Total Hamming distance between the counted motifs and their consensus.
        pub fn score(&self) -> usize {
            let matches: usize = (0..self.k)
                .map(|i| self.counts.iter().map(|v| v[i]).max().unwrap_or(0))
                .sum();
            (self.k * self.n) - matches
        }
    }

    /// Total Hamming distance between each motif and the consensus of the collection.
    pub fn score_motifs<M: AsRef<[u8]>>(motifs: &[M]) -> Result<usize> {
        Ok(Counts::new(motifs)?.score())
    }

    /// A 4 x k matrix of nucleotide probabilities, one column per motif position.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Profile {
        k: usize,
        rows: Vec<Vec<f64>>,
    }

    impl Profile {
        const TOLERANCE: f64 = 1e-6;

        /// Probability of each nucleotide in each column is its count divided by the number of
        /// motifs. With `pseudocount`, every count is incremented by one (and the denominator
        /// by four) so that no probability is zero.
        pub fn from_motifs<M: AsRef<[u8]>>(motifs: &[M], pseudocount: bool) -> Result<Self> {
            Self::from_counts(&Counts::new(motifs)?, pseudocount)
        }

        pub fn from_counts(counts: &Counts, pseudocount: bool) -> Result<Self> {
            let extra = usize::from(pseudocount);
            let total = counts.n + 4 * extra;
            if total == 0 {
                return Err(Error::InvalidInput(
                    "cannot build a profile from zero motifs without pseudocounts".to_owned(),
                ));
            }
            let rows = counts
                .counts
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|count| (count + extra) as f64 / total as f64)
                        .collect()
                })
                .collect();
            Ok(Self { k: counts.k, rows })
        }

        /// Builds a profile from rows of probabilities in `ACGT` order. Every row must have the
        /// same length and every column must sum to 1.
        pub fn from_rows(rows: [Vec<f64>; 4]) -> Result<Self> {
            let k = rows[0].len();
            if let Some(row) = rows.iter().position(|row| row.len() != k) {
                return Err(Error::InvalidInput(format!(
                    "profile row {} has {} columns, expected {}",
                    NUCS[row] as char,
                    rows[row].len(),
                    k
                )));
            }
            for i in 0..k {
                if rows
                    .iter()
                    .any(|row| !row[i].is_finite() || !(0.0..=1.0).contains(&row[i]))
                {
                    return Err(Error::InvalidInput(format!(
                        "profile column {} has a value outside [0, 1]",
                        i
                    )));
                }
                let sum: f64 = rows.iter().map(|row| row[i]).sum();
                if (sum - 1.0).abs() > Self::TOLERANCE {
                    return Err(Error::InvalidInput(format!(
                        "profile column {} sums to {}",
                        i, sum
                    )));
                }
            }
            Ok(Self {
                k,
                rows: rows.into_iter().collect(),
            })
        }

        pub fn k(&self) -> usize {
            self.k
        }

        /// Probabilities of `nuc` across the columns.
        pub fn row(&self, nuc: u8) -> Option<&[f64]> {
            Alphabet::DNA.rank(nuc).map(|row| self.rows[row].as_slice())
        }

        /// Product of the column probabilities, accumulated left to right. Unknown symbols have
        /// probability zero.
        pub(crate) fn probability_unchecked(&self, kmer: &[u8]) -> f64 {
            kmer.iter()
                .enumerate()
                .map(|(i, nuc)| Alphabet::DNA.rank(*nuc).map_or(0.0, |row| self.rows[row][i]))
                .product()
        }

        pub fn probability<K: AsRef<[u8]>>(&self, kmer: K) -> Result<f64> {
            let kmer = kmer.as_ref();
            if kmer.len() != self.k {
                return Err(Error::LengthMismatch {
                    left: self.k,
                    right: kmer.len(),
                });
            }
            Alphabet::DNA.validate(kmer)?;
            Ok(self.probability_unchecked(kmer))
        }

        fn check_text(&self, text: &[u8]) -> Result<()> {
            if text.len() < self.k {
                return Err(Error::InvalidInput(format!(
                    "text of length {} is shorter than the profile ({} columns)",
                    text.len(),
                    self.k
                )));
            }
            Alphabet::DNA.validate(text)
        }

        /// Probability of every window of `text`, by start offset.
        pub fn kmer_probabilities<T: AsRef<[u8]>>(&self, text: T) -> Result<Vec<f64>> {
            let text = text.as_ref();
            self.check_text(text)?;
            Ok(text
                .windows(self.k)
                .map(|kmer| self.probability_unchecked(kmer))
                .collect())
        }

        /// Windows of `text` sharing the highest probability, in scan order. The running
        /// maximum starts at zero, so if no window has positive probability all of them tie.
        pub fn most_probable_kmers<'a>(&self, text: &'a [u8]) -> Result<Vec<&'a [u8]>> {
            self.check_text(text)?;
            let mut most_probable = Vec::new();
            let mut max_p = 0.0;
            for kmer in text.windows(self.k) {
                let p = self.probability_unchecked(kmer);
                if p == max_p {
                    most_probable.push(kmer);
                } else if p > max_p {
                    most_probable.clear();
                    most_probable.push(kmer);
                    max_p = p;
                }
            }
            Ok(most_probable)
        }

        /// The first of `most_probable_kmers`.
        pub fn most_probable_kmer<'a>(&self, text: &'a [u8]) -> Result<&'a [u8]> {
            self.check_text(text)?;
            Ok(self.most_probable_unchecked(text))
        }

        /// Assumes `text.len() >= self.k`.
        pub(crate) fn most_probable_unchecked<'a>(&self, text: &'a [u8]) -> &'a [u8] {
            let mut most_probable = &text[..self.k];
            let mut max_p = 0.0;
            for kmer in text.windows(self.k) {
                let p = self.probability_unchecked(kmer);
                if p > max_p {
                    most_probable = kmer;
                    max_p = p;
                }
            }
            most_probable
        }

        /// Relative sampling weights of the windows of `text`, computed in log space and
        /// scaled so the most probable window has weight 1.
        pub(crate) fn sampling_weights(&self, text: &[u8]) -> Vec<f64> {
            let log_p: Vec<f64> = text
                .windows(self.k)
                .map(|kmer| {
                    kmer.iter()
                        .enumerate()
                        .map(|(i, nuc)| {
                            Alphabet::DNA
                                .rank(*nuc)
                                .map_or(f64::NEG_INFINITY, |row| self.rows[row][i].ln())
                        })
                        .sum()
                })
                .collect();
            let max = log_p.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            log_p.into_iter().map(|lp| (lp - max).exp()).collect()
        }

        /// Most probable nucleotide of each column; ties go to the first in `ACGT` order.
        pub fn consensus(&self) -> Vec<u8> {
            (0..self.k)
                .map(|i| {
                    let mut best = 0;
                    for row in 1..4 {
                        if self.rows[row][i] > self.rows[best][i] {
                            best = row;
                        }
                    }
                    NUCS[best]
                })
                .collect()
        }

        /// Total Hamming distance between `motifs` and the consensus of this profile.
        pub fn score<M: AsRef<[u8]>>(&self, motifs: &[M]) -> Result<usize> {
            let consensus = self.consensus();
            motifs
                .iter()
                .map(|motif| hamming_distance(motif, &consensus))
                .sum()
        }
    }

}

pub mod greedy {
    use super::{
        check_strands,
        median::total_distance,
        profile::{Counts, Profile},
    };
    use crate::Result;
    use log::debug;

    /// Seeds a motif set with every window of the first strand and extends it strand by strand
    /// with the most probable k-mer under the profile of the motifs chosen so far. A candidate
    /// is scored by the distance between the consensus of its last profile and the strands;
    /// the first seed with the lowest score wins.
    pub fn greedy_motif_search<'a, S: AsRef<[u8]>>(
        dna: &'a [S],
        k: usize,
        pseudocount: bool,
    ) -> Result<Vec<&'a [u8]>> {
        check_strands(dna, k, true)?;
        let strands: Vec<&'a [u8]> = dna.iter().map(|strand| strand.as_ref()).collect();
        let mut best_motifs: Vec<&'a [u8]> = strands.iter().map(|strand| &strand[..k]).collect();
        let mut best_score = strands.len() * k;
        for seed in strands[0].windows(k) {
            let mut counts = Counts::empty(k);
            counts.add(seed)?;
            let mut motifs = Vec::with_capacity(strands.len());
            motifs.push(seed);
            let mut profile = Profile::from_counts(&counts, pseudocount)?;
            for strand in &strands[1..] {
                profile = Profile::from_counts(&counts, pseudocount)?;
                let motif = profile.most_probable_unchecked(strand);
                counts.add(motif)?;
                motifs.push(motif);
            }
            let score = total_distance(&profile.consensus(), &strands);
            if score < best_score {
                best_score = score;
                best_motifs = motifs;
            }
        }
        debug!(
            "greedy search (k = {}, pseudocount = {}) finished with score {}",
            k, pseudocount, best_score
        );
        Ok(best_motifs)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::Error;
        use lazy_static::lazy_static;

        const DNA: [&str; 5] = [
            "GGCGTTCAGGCA",
            "AAGAATCAGTCA",
            "CAAGGAGTTCGC",
            "CACGTCAATCAC",
            "CAATAATATTCG",
        ];

        lazy_static! {
            static ref DNA_BIG: Vec<&'static str> = vec![
                "ATGACCGGGATACTGATAAAAAAAAGGGGGGGGGCGTACACATTAGATAAACGTATGAAGTACGTTAGACTCGGCGCCGCCG",
                "ACCCCTATTTTTTGAGCAGATTTAGTGACCTGGAAAAAAAATTTGAGTACAAAACTTTTCCGAATACAATAAAACGGCGGGA",
                "TGAGTATCCCTGGGATGACTTAAAATAATGGAGTGGTGCTCTCCCGATTTTTGAATATGTAGGATCATTCGCCAGGGTCCGA",
                "GCTGAGAATTGGATGCAAAAAAAGGGATTGTCCACGCAATCGCGAACCAACGCGGACCCAAAGGCAAGACCGATAAAGGAGA",
                "TCCCTTTTGCGGTAATGTGCCGGGAGGCTGGTTACGTAGGGAAGCCCTAACGGACTTAATATAATAAAGGAAGGGCTTATAG",
                "GTCAATCATGTTCTTGTGAATGGATTTAACAATAAGGGCTGGGACCGCTTGGCGCACCCAAATTCAGTGTGGGCGAGCGCAA",
                "CGGTTTTGGCCCTTGTTAGAGGCCCCCGTATAAACAAGGAGGGCCAATTATGAGAGAGCTAATCTATCGCGTGCGTGTTCAT",
                "AACTTGAGTTAAAAAATAGGGAGCCCTGGGGCACATACAAGAGGAGTCTTCCTTATCAGTTAATGCTGTATGACACTATGTA",
                "TTGGCCCATTGGCTAAAAGCCCAACTTGACAAATGGAAGATAGAATCCTTGCATACTAAAAAGGAGCGGACCGAAAGGGAAG",
                "CTGGTGAGCAACGACAGATTCTTACGTGCATTAGCTCGCTTCCGGGGATCTAATAGCACGAAGCTTACTAAAAAGGAGCGGA"
            ];
        }

        fn owned(motifs: Vec<&[u8]>) -> Vec<String> {
            motifs
                .into_iter()
                .map(|motif| String::from_utf8_lossy(motif).into_owned())
                .collect()
        }

        #[test]
        fn test_greedy_motif_search() {
            let motifs = greedy_motif_search(&DNA, 3, false).unwrap();
            assert_eq!(owned(motifs), vec!["TCA", "TCA", "CAA", "TCA", "TAA"]);
        }

        #[test]
        fn test_greedy_motif_search_pseudocount() {
            let motifs = greedy_motif_search(&DNA, 3, true).unwrap();
            assert_eq!(owned(motifs), vec!["TCA", "TCA", "TCG", "TCA", "TCG"]);
        }

        #[test]
        fn test_greedy_motif_search_big() {
            let motifs = greedy_motif_search(&DNA_BIG, 15, true).unwrap();
            assert_eq!(
                owned(motifs),
                vec![
                    "TAAAAAAAAGGGGGG",
                    "CAATAAAACGGCGGG",
                    "TAAAATAATGGAGTG",
                    "CAAAAAAAGGGATTG",
                    "TATAATAAAGGAAGG",
                    "AACAATAAGGGCTGG",
                    "TATAAACAAGGAGGG",
                    "TAAAAAATAGGGAGC",
                    "TACTAAAAAGGAGCG",
                    "TACTAAAAAGGAGCG",
                ]
            );
        }

        #[test]
        fn test_greedy_motif_search_deterministic() {
            let first = greedy_motif_search(&DNA_BIG, 12, false).unwrap();
            let second = greedy_motif_search(&DNA_BIG, 12, false).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), DNA_BIG.len());
            for (motif, strand) in first.iter().zip(DNA_BIG.iter()) {
                assert_eq!(motif.len(), 12);
                assert!(strand.as_bytes().windows(12).any(|w| w == *motif));
            }
        }

        #[test]
        fn test_greedy_motif_search_single_strand() {
            let dna = ["ACGTAC"];
            assert_eq!(owned(greedy_motif_search(&dna, 3, false).unwrap()), vec!["ACG"]);
        }

        #[test]
        fn test_greedy_motif_search_invalid() {
            assert_eq!(
                greedy_motif_search(&["ACGTAC", "ACGTA"], 3, false),
                Err(Error::UnequalStrandLength {
                    index: 1,
                    expected: 6,
                    found: 5
                })
            );
            assert!(matches!(
                greedy_motif_search(&["AC", "GT"], 3, false),
                Err(Error::InvalidInput(_))
            ));
        }
    }
}

pub mod randomized {
    use super::{
        check_strands,
        profile::{Counts, Profile},
        random_motifs,
    };
    use crate::{Error, Result};
    use log::{debug, trace};
    use rand::Rng;

    /// Randomized motif search with a fixed number of independent restarts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RandomizedSearch {
        pub iterations: usize,
    }

    impl Default for RandomizedSearch {
        fn default() -> Self {
            RandomizedSearch { iterations: 1000 }
        }
    }

    impl RandomizedSearch {
        pub fn new(iterations: usize) -> Self {
            RandomizedSearch { iterations }
        }

        /// Each iteration starts from a random motif set and repeatedly replaces it with the
        /// most probable k-mers under its pseudocount profile, for as long as the score strictly
        /// improves. The best set over all iterations is returned.
        pub fn run<'a, S: AsRef<[u8]>, R: Rng>(
            &self,
            dna: &'a [S],
            k: usize,
            rng: &mut R,
        ) -> Result<Vec<&'a [u8]>> {
            check_strands(dna, k, true)?;
            if self.iterations == 0 {
                return Err(Error::InvalidInput(
                    "randomized search needs at least one iteration".to_owned(),
                ));
            }
            let strands: Vec<&'a [u8]> = dna.iter().map(|strand| strand.as_ref()).collect();
            let (mut best_motifs, mut best_score) = climb(&strands, k, rng)?;
            for iteration in 1..self.iterations {
                let (motifs, score) = climb(&strands, k, rng)?;
                if score < best_score {
                    trace!("iteration {}: score {} -> {}", iteration, best_score, score);
                    best_motifs = motifs;
                    best_score = score;
                }
            }
            debug!(
                "randomized search (k = {}, {} iterations) finished with score {}",
                k, self.iterations, best_score
            );
            Ok(best_motifs)
        }
    }

    fn climb<'a, R: Rng>(
        strands: &[&'a [u8]],
        k: usize,
        rng: &mut R,
    ) -> Result<(Vec<&'a [u8]>, usize)> {
        let mut motifs = random_motifs(strands, k, rng);
        let mut score = Counts::new(&motifs)?.score();
        loop {
            let profile = Profile::from_motifs(&motifs, true)?;
            let next: Vec<&'a [u8]> = strands
                .iter()
                .map(|strand| profile.most_probable_unchecked(strand))
                .collect();
            let next_score = Counts::new(&next)?.score();
            if next_score < score {
                motifs = next;
                score = next_score;
            } else {
                return Ok((motifs, score));
            }
        }
    }

    pub fn randomized_motif_search<'a, S: AsRef<[u8]>, R: Rng>(
        dna: &'a [S],
        k: usize,
        iterations: usize,
        rng: &mut R,
    ) -> Result<Vec<&'a [u8]>> {
        RandomizedSearch::new(iterations).run(dna, k, rng)
    }

    #[cfg(test)]
    mod tests {
        use super::{
            super::tests::{init_logger, PLANTED},
            *,
        };
        use crate::ch2::profile::score_motifs;
        use rand::{rngs::StdRng, SeedableRng};

        #[test]
        fn test_randomized_motif_search_planted() {
            init_logger();
            let mut rng = StdRng::seed_from_u64(42);
            let motifs = randomized_motif_search(&PLANTED, 8, 200, &mut rng).unwrap();
            assert_eq!(motifs, vec![&b"TGCAAGTG"[..]; PLANTED.len()]);
        }

        #[test]
        fn test_randomized_motif_search_deterministic() {
            let search = RandomizedSearch::new(25);
            let first = search.run(&PLANTED, 6, &mut StdRng::seed_from_u64(7)).unwrap();
            let second = search.run(&PLANTED, 6, &mut StdRng::seed_from_u64(7)).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), PLANTED.len());
            for (motif, strand) in first.iter().zip(PLANTED.iter()) {
                assert_eq!(motif.len(), 6);
                assert!(strand.as_bytes().windows(6).any(|w| w == *motif));
            }
        }

        #[test]
        fn test_more_iterations_never_worse() {
            // both runs share their first iteration
            let few =
                randomized_motif_search(&PLANTED, 8, 1, &mut StdRng::seed_from_u64(3)).unwrap();
            let many =
                randomized_motif_search(&PLANTED, 8, 50, &mut StdRng::seed_from_u64(3)).unwrap();
            assert!(score_motifs(&many).unwrap() <= score_motifs(&few).unwrap());
        }

        #[test]
        fn test_randomized_motif_search_invalid() {
            let mut rng = StdRng::seed_from_u64(0);
            assert!(matches!(
                randomized_motif_search(&PLANTED, 8, 0, &mut rng),
                Err(Error::InvalidInput(_))
            ));
            assert!(matches!(
                randomized_motif_search(&["ACGTAC", "ACG"], 3, 10, &mut rng),
                Err(Error::UnequalStrandLength { .. })
            ));
            assert_eq!(RandomizedSearch::default().iterations, 1000);
        }
    }
}

pub mod gibbs {
    use super::{
        check_strands,
        profile::{Counts, Profile},
        random_motifs,
    };
    use crate::{Error, Result};
    use log::{debug, trace};
    use rand::{distributions::WeightedIndex, prelude::*};

    /// Gibbs sampling: random restarts, each perturbing one motif per iteration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GibbsSampler {
        pub restarts: usize,
        pub iterations: usize,
    }

    impl Default for GibbsSampler {
        fn default() -> Self {
            GibbsSampler {
                restarts: 20,
                iterations: 1000,
            }
        }
    }

    impl GibbsSampler {
        pub fn new(restarts: usize, iterations: usize) -> Self {
            GibbsSampler {
                restarts,
                iterations,
            }
        }

        /// Each iteration drops the motif of one uniformly chosen strand, builds a pseudocount
        /// profile from the others, and replaces the dropped motif with a window of its strand
        /// drawn with probability proportional to the profile. The best set seen in any
        /// iteration of any restart is returned.
        pub fn run<'a, S: AsRef<[u8]>, R: Rng>(
            &self,
            dna: &'a [S],
            k: usize,
            rng: &mut R,
        ) -> Result<Vec<&'a [u8]>> {
            check_strands(dna, k, true)?;
            if self.restarts == 0 {
                return Err(Error::InvalidInput(
                    "Gibbs sampling needs at least one restart".to_owned(),
                ));
            }
            let strands: Vec<&'a [u8]> = dna.iter().map(|strand| strand.as_ref()).collect();
            let (mut best_motifs, mut best_score) = self.sample(&strands, k, rng)?;
            for restart in 1..self.restarts {
                let (motifs, score) = self.sample(&strands, k, rng)?;
                if score < best_score {
                    trace!("restart {}: score {} -> {}", restart, best_score, score);
                    best_motifs = motifs;
                    best_score = score;
                }
            }
            debug!(
                "Gibbs sampling (k = {}, {} restarts x {} iterations) finished with score {}",
                k, self.restarts, self.iterations, best_score
            );
            Ok(best_motifs)
        }

        fn sample<'a, R: Rng>(
            &self,
            strands: &[&'a [u8]],
            k: usize,
            rng: &mut R,
        ) -> Result<(Vec<&'a [u8]>, usize)> {
            let mut motifs = random_motifs(strands, k, rng);
            let mut counts = Counts::new(&motifs)?;
            let mut best_motifs = motifs.clone();
            let mut best_score = counts.score();
            for _ in 0..self.iterations {
                let i = rng.gen_range(0..strands.len());
                counts.remove(motifs[i])?;
                let profile = Profile::from_counts(&counts, true)?;
                let weights = profile.sampling_weights(strands[i]);
                let start = WeightedIndex::new(&weights)
                    .map_err(|e| {
                        Error::InvalidInput(format!("cannot sample strand {}: {}", i, e))
                    })?
                    .sample(rng);
                motifs[i] = &strands[i][start..start + k];
                counts.add(motifs[i])?;
                let score = counts.score();
                if score < best_score {
                    best_motifs.copy_from_slice(&motifs);
                    best_score = score;
                }
            }
            Ok((best_motifs, best_score))
        }
    }

    pub fn gibbs_sampler<'a, S: AsRef<[u8]>, R: Rng>(
        dna: &'a [S],
        k: usize,
        restarts: usize,
        iterations: usize,
        rng: &mut R,
    ) -> Result<Vec<&'a [u8]>> {
        GibbsSampler::new(restarts, iterations).run(dna, k, rng)
    }

    #[cfg(test)]
    mod tests {
        use super::{
            super::{
                random_motifs,
                tests::{init_logger, PLANTED},
            },
            *,
        };
        use crate::ch2::profile::score_motifs;
        use rand::{rngs::StdRng, SeedableRng};

        #[test]
        fn test_gibbs_sampler_planted() {
            init_logger();
            let mut rng = StdRng::seed_from_u64(42);
            let motifs = gibbs_sampler(&PLANTED, 8, 20, 200, &mut rng).unwrap();
            assert_eq!(motifs, vec![&b"TGCAAGTG"[..]; PLANTED.len()]);
        }

        #[test]
        fn test_gibbs_sampler_deterministic() {
            let sampler = GibbsSampler::new(3, 50);
            let first = sampler.run(&PLANTED, 6, &mut StdRng::seed_from_u64(11)).unwrap();
            let second = sampler.run(&PLANTED, 6, &mut StdRng::seed_from_u64(11)).unwrap();
            assert_eq!(first, second);
            for (motif, strand) in first.iter().zip(PLANTED.iter()) {
                assert_eq!(motif.len(), 6);
                assert!(strand.as_bytes().windows(6).any(|w| w == *motif));
            }
        }

        #[test]
        fn test_gibbs_sampler_without_iterations() {
            // returns the random starting set of the best restart
            let motifs =
                gibbs_sampler(&PLANTED, 5, 4, 0, &mut StdRng::seed_from_u64(5)).unwrap();
            assert_eq!(motifs.len(), PLANTED.len());
            assert!(score_motifs(&motifs).unwrap() <= PLANTED.len() * 5);

            let strands: Vec<&[u8]> = PLANTED.iter().map(|s| s.as_bytes()).collect();
            let start = random_motifs(&strands, 5, &mut StdRng::seed_from_u64(9));
            let single = GibbsSampler::new(1, 0)
                .run(&PLANTED, 5, &mut StdRng::seed_from_u64(9))
                .unwrap();
            assert_eq!(single, start);
        }

        #[test]
        fn test_gibbs_sampler_single_strand() {
            let dna = ["ACGTTGCA"];
            let motifs = gibbs_sampler(&dna, 4, 2, 10, &mut StdRng::seed_from_u64(1)).unwrap();
            assert_eq!(motifs.len(), 1);
            assert_eq!(score_motifs(&motifs).unwrap(), 0);
        }

        #[test]
        fn test_gibbs_sampler_invalid() {
            let mut rng = StdRng::seed_from_u64(0);
            assert!(matches!(
                gibbs_sampler(&PLANTED, 8, 0, 10, &mut rng),
                Err(Error::InvalidInput(_))
            ));
            assert!(matches!(
                gibbs_sampler(&["ACGTAC", "ACGTACG"], 3, 1, 10, &mut rng),
                Err(Error::UnequalStrandLength { .. })
            ));
            let empty: [&str; 0] = [];
            assert!(matches!(
                gibbs_sampler(&empty, 3, 1, 10, &mut rng),
                Err(Error::InvalidInput(_))
            ));
            let defaults = GibbsSampler::default();
            assert_eq!((defaults.restarts, defaults.iterations), (20, 1000));
        }
    }
}
