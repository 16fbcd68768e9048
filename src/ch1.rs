pub mod alphabet {
    use crate::{Error, Result};
    use lazy_static::lazy_static;

    lazy_static! {
        /// Rank of each upper-case nucleotide in `ACGT` order, `None` for every other byte.
        static ref DNA_RANKS: [Option<u8>; 256] = {
            let mut ranks = [None; 256];
            for (rank, nuc) in Alphabet::DNA.symbols.iter().enumerate() {
                ranks[*nuc as usize] = Some(rank as u8);
            }
            ranks
        };
    }

    /// An ordered symbol table. The rank of a symbol is its index in the table; the codec
    /// interprets ranks as digits and the neighborhood generator substitutes symbols in rank
    /// order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Alphabet {
        symbols: &'static [u8],
    }

    impl Alphabet {
        /// Nucleotides in alphabetical order: A=0, C=1, G=2, T=3.
        pub const DNA: Alphabet = Alphabet { symbols: b"ACGT" };

        /// Creates an alphabet from at least two distinct symbols.
        pub fn new(symbols: &'static [u8]) -> Result<Self> {
            if symbols.len() < 2 {
                return Err(Error::InvalidInput(format!(
                    "an alphabet needs at least two symbols, got {}",
                    symbols.len()
                )));
            }
            for (i, symbol) in symbols.iter().enumerate() {
                if symbols[..i].contains(symbol) {
                    return Err(Error::InvalidInput(format!(
                        "duplicate symbol {:?} in alphabet",
                        *symbol as char
                    )));
                }
            }
            Ok(Alphabet { symbols })
        }

        pub fn symbols(&self) -> &'static [u8] {
            self.symbols
        }

        pub fn len(&self) -> usize {
            self.symbols.len()
        }

        pub fn is_empty(&self) -> bool {
            self.symbols.is_empty()
        }

        pub fn rank(&self, symbol: u8) -> Option<usize> {
            if self.symbols == Self::DNA.symbols {
                DNA_RANKS[symbol as usize].map(usize::from)
            } else {
                self.symbols.iter().position(|s| *s == symbol)
            }
        }

        pub fn symbol(&self, rank: usize) -> Option<u8> {
            self.symbols.get(rank).copied()
        }

        /// Returns `InvalidSymbol` for the first byte of `text` that is not in the alphabet.
        pub fn validate(&self, text: &[u8]) -> Result<()> {
            match text.iter().position(|c| self.rank(*c).is_none()) {
                Some(position) => Err(Error::InvalidSymbol {
                    symbol: text[position] as char,
                    position,
                }),
                None => Ok(()),
            }
        }
    }

    impl Default for Alphabet {
        fn default() -> Self {
            Alphabet::DNA
        }
    }

    pub(crate) fn check_dna(text: &[u8]) -> Result<()> {
        Alphabet::DNA.validate(text)
    }

}

pub mod frequency {
    use super::{
        alphabet::{check_dna, Alphabet},
        mismatches::neighbors_unchecked,
        revcomp::reverse_complement_unchecked,
    };
    use crate::{Error, Result};
    use log::debug;
    use std::{cmp::Reverse, collections::HashMap};

    /// Counts the (possibly overlapping) occurrences of `pattern` in `text`. An empty pattern
    /// never matches.
    pub fn pattern_count<T: AsRef<[u8]>, P: AsRef<[u8]>>(text: T, pattern: P) -> usize {
        let text = text.as_ref();
        let pattern = pattern.as_ref();
        if pattern.is_empty() || text.len() < pattern.len() {
            return 0;
        }
        text.windows(pattern.len())
            .filter(|kmer| *kmer == pattern)
            .count()
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Entry {
        count: usize,
        first_seen: usize,
    }

    /// Occurrence counts of k-mers. Every key remembers when it was first inserted so that
    /// ranking by count breaks ties in first-occurrence order.
    #[derive(Debug, Clone, Default)]
    pub struct FrequencyTable {
        entries: HashMap<Vec<u8>, Entry>,
        next_rank: usize,
    }

    impl FrequencyTable {
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds one occurrence of `kmer` and returns its updated count.
        pub fn increment(&mut self, kmer: &[u8]) -> usize {
            if let Some(entry) = self.entries.get_mut(kmer) {
                entry.count += 1;
                return entry.count;
            }
            self.entries.insert(
                kmer.to_vec(),
                Entry {
                    count: 1,
                    first_seen: self.next_rank,
                },
            );
            self.next_rank += 1;
            1
        }

        /// Removes one occurrence of `kmer` and returns its updated count. A key whose count
        /// drops to zero is kept, along with its first-occurrence rank.
        pub fn decrement(&mut self, kmer: &[u8]) -> usize {
            match self.entries.get_mut(kmer) {
                Some(entry) => {
                    entry.count = entry.count.saturating_sub(1);
                    entry.count
                }
                None => 0,
            }
        }

        pub fn get(&self, kmer: &[u8]) -> usize {
            self.entries.get(kmer).map_or(0, |entry| entry.count)
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        pub fn max_count(&self) -> usize {
            self.entries
                .values()
                .map(|entry| entry.count)
                .max()
                .unwrap_or(0)
        }

        /// All keys with their counts, most common first, ties in first-occurrence order.
        pub fn ranked(&self) -> Vec<(&[u8], usize)> {
            let mut ranked: Vec<(&[u8], Entry)> = self
                .entries
                .iter()
                .map(|(kmer, entry)| (kmer.as_slice(), *entry))
                .collect();
            ranked.sort_unstable_by_key(|(_, entry)| (Reverse(entry.count), entry.first_seen));
            ranked
                .into_iter()
                .map(|(kmer, entry)| (kmer, entry.count))
                .collect()
        }

        /// Keys that occur at least `min_count` times, in ranked order.
        pub fn at_least(&self, min_count: usize) -> Vec<&[u8]> {
            self.ranked()
                .into_iter()
                .take_while(|(_, count)| *count >= min_count)
                .map(|(kmer, _)| kmer)
                .collect()
        }

        /// Keys sharing the highest count, in first-occurrence order.
        pub fn most_frequent(&self) -> Vec<&[u8]> {
            if self.is_empty() {
                return Vec::new();
            }
            self.at_least(self.max_count())
        }

        pub fn iter(&self) -> impl Iterator<Item = (&[u8], usize)> {
            self.entries
                .iter()
                .map(|(kmer, entry)| (kmer.as_slice(), entry.count))
        }
    }

    /// How k-mers are counted: window length, how many mismatches fold a window into a
    /// neighbor's bucket, and whether the reverse strand is scanned as well.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CountOptions {
        pub k: usize,
        pub max_distance: usize,
        pub reverse_complement: bool,
    }

    impl CountOptions {
        pub fn new(k: usize) -> Self {
            CountOptions {
                k,
                max_distance: 0,
                reverse_complement: false,
            }
        }

        pub fn max_distance(mut self, max_distance: usize) -> Self {
            self.max_distance = max_distance;
            self
        }

        pub fn reverse_complement(mut self, reverse_complement: bool) -> Self {
            self.reverse_complement = reverse_complement;
            self
        }

        /// Builds the frequency table of `text`. Each window credits every member of its
        /// Hamming neighborhood; the reverse complement, if requested, is scanned after the
        /// forward strand into the same table.
        pub fn count<T: AsRef<[u8]>>(&self, text: T) -> Result<FrequencyTable> {
            let text = text.as_ref();
            if self.k == 0 {
                return Err(Error::InvalidInput("k must be positive".to_owned()));
            }
            check_dna(text)?;
            let mut table = FrequencyTable::new();
            self.count_into(text, &mut table);
            if self.reverse_complement {
                let rc = reverse_complement_unchecked(text);
                self.count_into(&rc, &mut table);
            }
            debug!(
                "counted {} distinct {}-mers (d = {}, reverse complement = {})",
                table.len(),
                self.k,
                self.max_distance,
                self.reverse_complement
            );
            Ok(table)
        }

        fn count_into(&self, text: &[u8], table: &mut FrequencyTable) {
            if text.len() < self.k {
                return;
            }
            for kmer in text.windows(self.k) {
                if self.max_distance == 0 {
                    table.increment(kmer);
                } else {
                    for neighbor in neighbors_unchecked(kmer, &Alphabet::DNA, self.max_distance) {
                        table.increment(&neighbor);
                    }
                }
            }
        }
    }

    pub fn count_kmers<T: AsRef<[u8]>>(text: T, k: usize) -> Result<FrequencyTable> {
        CountOptions::new(k).count(text)
    }

    pub fn count_kmers_approx<T: AsRef<[u8]>>(
        text: T,
        k: usize,
        max_distance: usize,
    ) -> Result<FrequencyTable> {
        CountOptions::new(k).max_distance(max_distance).count(text)
    }

    pub fn count_kmers_with_rc<T: AsRef<[u8]>>(
        text: T,
        k: usize,
        max_distance: usize,
    ) -> Result<FrequencyTable> {
        CountOptions::new(k)
            .max_distance(max_distance)
            .reverse_complement(true)
            .count(text)
    }

    /// K-mers occurring at least `min_count` times, most common first.
    pub fn frequent_kmers<T: AsRef<[u8]>>(
        text: T,
        options: &CountOptions,
        min_count: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let table = options.count(text)?;
        Ok(table
            .at_least(min_count)
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect())
    }

    /// The most frequent k-mers together with their shared count.
    pub fn most_frequent_kmers<T: AsRef<[u8]>>(
        text: T,
        options: &CountOptions,
    ) -> Result<(Vec<Vec<u8>>, usize)> {
        let table = options.count(text)?;
        let max_count = table.max_count();
        let most_frequent = table
            .most_frequent()
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect();
        Ok((most_frequent, max_count))
    }

}

pub mod revcomp {
    use super::alphabet::check_dna;
    use crate::{Error, Result};
    use lazy_static::lazy_static;
    use pulp::Arch;
    use std::str::FromStr;

    lazy_static! {
        /// Watson-Crick complement of each nucleotide; other bytes map to themselves.
        static ref COMPLEMENT: [u8; 256] = {
            let mut table = [0u8; 256];
            for (i, c) in table.iter_mut().enumerate() {
                *c = i as u8;
            }
            for (nuc, comp) in [(b'A', b'T'), (b'C', b'G'), (b'G', b'C'), (b'T', b'A')] {
                table[nuc as usize] = comp;
            }
            table
        };
    }

    /// Complement a mutable byte. Assumes that `c` is one of `{A,C,G,T}`. Uses XOR to flip the
    /// bits that differ between A<->T (21) or C<->G (4).
    fn complement_mut(c: &mut u8) {
        let val = *c;
        if val & 2 != 0 {
            *c = val ^ 4
        } else {
            *c = val ^ 21
        }
    }

    pub(crate) fn reverse_complement_unchecked(pattern: &[u8]) -> Vec<u8> {
        pattern
            .iter()
            .rev()
            .map(|nuc| COMPLEMENT[*nuc as usize])
            .collect()
    }

    /// Complements every nucleotide of `pattern` and reverses the result.
    pub fn reverse_complement<P: AsRef<[u8]>>(pattern: P) -> Result<Vec<u8>> {
        let pattern = pattern.as_ref();
        check_dna(pattern)?;
        Ok(reverse_complement_unchecked(pattern))
    }

    /// An owned nucleotide sequence, validated on construction.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Seq(Vec<u8>);

    impl Seq {
        pub fn new(bytes: &[u8]) -> Result<Self> {
            check_dna(bytes)?;
            Ok(Seq(Vec::from(bytes)))
        }

        pub fn as_bytes(&self) -> &[u8] {
            &self.0
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn into_inner(self) -> Vec<u8> {
            self.0
        }

        /// Reverse-complements this sequence
        pub fn reverse_complement(&mut self) {
            self.0.reverse();
            self.0.iter_mut().for_each(complement_mut);
        }

        // Note: pulp only vectorizes on x86 and aarch64; elsewhere this is the scalar loop
        pub fn reverse_complement_simd(&mut self, arch: &Arch) {
            arch.dispatch(|| {
                self.0.reverse();
                self.0.iter_mut().for_each(complement_mut);
            });
        }

        pub fn as_reverse_complement(&self) -> Self {
            Seq(reverse_complement_unchecked(&self.0))
        }
    }

    impl FromStr for Seq {
        type Err = Error;

        fn from_str(s: &str) -> Result<Self> {
            Seq::new(s.as_bytes())
        }
    }

    impl AsRef<[u8]> for Seq {
        fn as_ref(&self) -> &[u8] {
            &self.0
        }
    }

    /// Start offsets of every (possibly overlapping) exact occurrence of `pattern` in `text`.
    pub fn find_pattern<T: AsRef<[u8]>, P: AsRef<[u8]>>(text: T, pattern: P) -> Vec<usize> {
        let text = text.as_ref();
        let pattern = pattern.as_ref();
        if pattern.is_empty() || text.len() < pattern.len() {
            return Vec::new();
        }
        text.windows(pattern.len())
            .enumerate()
            .filter(|(_, kmer)| *kmer == pattern)
            .map(|(i, _)| i)
            .collect()
    }

}

pub mod clumps {
    use super::{alphabet::check_dna, frequency::count_kmers};
    use crate::{Error, Result};
    use log::debug;
    use std::collections::HashSet;

    // T = text size
    // W = window size

    /// Finds every k-mer occurring at least `min_occurrences` times inside some window of
    /// `window_size` symbols. The window slides one position at a time: the k-mer leaving on
    /// the left is decremented and the k-mer entering on the right is incremented, so only the
    /// entering k-mer can newly reach the threshold.
    ///
    /// Computational complexity: O(T)
    /// Memory complexity: O(W)
    pub fn find_clumps<T: AsRef<[u8]>>(
        text: T,
        k: usize,
        window_size: usize,
        min_occurrences: usize,
    ) -> Result<HashSet<Vec<u8>>> {
        let text = text.as_ref();
        if k == 0 {
            return Err(Error::InvalidInput("k must be positive".to_owned()));
        }
        if window_size < k || window_size > text.len() {
            return Err(Error::InvalidWindow {
                window: window_size,
                k,
                len: text.len(),
            });
        }
        check_dna(text)?;
        let mut counts = count_kmers(&text[..window_size], k)?;
        let mut clumps: HashSet<Vec<u8>> = counts
            .at_least(min_occurrences)
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect();
        for start in 1..=(text.len() - window_size) {
            counts.decrement(&text[start - 1..start - 1 + k]);
            let end = start + window_size;
            let entering = &text[end - k..end];
            if counts.increment(entering) >= min_occurrences {
                clumps.insert(entering.to_vec());
            }
        }
        debug!(
            "found {} ({}, {}, {})-clumps",
            clumps.len(),
            k,
            window_size,
            min_occurrences
        );
        Ok(clumps)
    }

    #[cfg(test)]
    mod tests {
        use super::{super::tests::ORI_REGION, *};
        use rand::{rngs::StdRng, Rng, SeedableRng};

        /// Recounts every window from scratch. O(T * W).
        fn find_clumps_frugal(
            text: &[u8],
            k: usize,
            window_size: usize,
            min_occurrences: usize,
        ) -> HashSet<Vec<u8>> {
            let mut clumps = HashSet::new();
            for window in text.windows(window_size) {
                let counts = count_kmers(window, k).unwrap();
                for kmer in counts.at_least(min_occurrences) {
                    clumps.insert(kmer.to_vec());
                }
            }
            clumps
        }

        fn set<K: AsRef<[u8]>>(kmers: &[K]) -> HashSet<Vec<u8>> {
            kmers.iter().map(|kmer| kmer.as_ref().to_vec()).collect()
        }

        #[test]
        fn test_find_clumps_small() {
            assert_eq!(find_clumps("AAAACGT", 1, 4, 3).unwrap(), set(&[b"A"]));
            let genome =
                "CGGACTCGACAGATGTGAAGAACGACAATGTGAAGACTCGACACGACAGAGTGAAGAGAAGAGGAAACATTGTAA";
            assert_eq!(
                find_clumps(genome, 5, 50, 4).unwrap(),
                set(&[b"CGACA", b"GAAGA"])
            );
        }

        #[test]
        fn test_find_clumps_ori() {
            let clumps = find_clumps(ORI_REGION.as_slice(), 9, 500, 3).unwrap();
            assert_eq!(
                clumps,
                set(&[b"ATGATCAAG", b"CTCTTGATC", b"CTTGATCAT", b"TCTTGATCA"])
            );
        }

        #[test]
        fn test_find_clumps_matches_frugal() {
            let mut rng = StdRng::seed_from_u64(7);
            for _ in 0..20 {
                let len = rng.gen_range(20..80);
                let text: Vec<u8> = (0..len).map(|_| b"ACGT"[rng.gen_range(0..2)]).collect();
                for (k, window_size, t) in [(2, 10, 3), (3, 15, 2), (4, 20, 3), (1, 5, 4)] {
                    assert_eq!(
                        find_clumps(&text, k, window_size, t).unwrap(),
                        find_clumps_frugal(&text, k, window_size, t),
                        "k={} L={} t={} text={}",
                        k,
                        window_size,
                        t,
                        String::from_utf8_lossy(&text)
                    );
                }
            }
        }

        #[test]
        fn test_find_clumps_invalid_window() {
            assert_eq!(
                find_clumps("ACGTACGT", 5, 4, 2),
                Err(Error::InvalidWindow {
                    window: 4,
                    k: 5,
                    len: 8
                })
            );
            assert!(matches!(
                find_clumps("ACGT", 2, 5, 2),
                Err(Error::InvalidWindow { .. })
            ));
            assert!(matches!(
                find_clumps("ACGT", 0, 2, 2),
                Err(Error::InvalidInput(_))
            ));
        }
    }
}

pub mod codec {
    use super::{alphabet::Alphabet, mismatches::neighbors_unchecked};
    use crate::{Error, Result};

    /// Largest `k` for which dense tables of all `4^k` k-mers are built.
    pub const MAX_DENSE_K: usize = 12;

    /// Number of patterns of length `k` over an alphabet of `base` symbols, if it fits.
    pub(crate) fn pattern_space(base: usize, k: usize) -> Option<usize> {
        u32::try_from(k).ok().and_then(|k| base.checked_pow(k))
    }

    /// Interprets `pattern` as a base-4 number with A=0, C=1, G=2, T=3.
    pub fn pattern_to_number<P: AsRef<[u8]>>(pattern: P) -> Result<u64> {
        pattern_to_number_with(pattern, &Alphabet::DNA)
    }

    /// Interprets `pattern` as a number whose digits are symbol ranks in `alphabet`.
    pub fn pattern_to_number_with<P: AsRef<[u8]>>(pattern: P, alphabet: &Alphabet) -> Result<u64> {
        let pattern = pattern.as_ref();
        let base = alphabet.len() as u64;
        pattern
            .iter()
            .enumerate()
            .try_fold(0u64, |number, (position, symbol)| {
                let digit = alphabet.rank(*symbol).ok_or(Error::InvalidSymbol {
                    symbol: *symbol as char,
                    position,
                })?;
                number
                    .checked_mul(base)
                    .and_then(|n| n.checked_add(digit as u64))
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "pattern of length {} does not fit in 64 bits",
                            pattern.len()
                        ))
                    })
            })
    }

    /// Inverse of `pattern_to_number`, left-padded with `A` to length `k`.
    pub fn number_to_pattern(number: u64, k: usize) -> Result<Vec<u8>> {
        number_to_pattern_with(number, k, &Alphabet::DNA)
    }

    pub fn number_to_pattern_with(number: u64, k: usize, alphabet: &Alphabet) -> Result<Vec<u8>> {
        let base = alphabet.len() as u64;
        let symbols = alphabet.symbols();
        let mut pattern = Vec::with_capacity(k);
        let mut rest = number;
        while rest > 0 {
            if pattern.len() == k {
                return Err(Error::InvalidLength { number, k });
            }
            pattern.push(symbols[(rest % base) as usize]);
            rest /= base;
        }
        pattern.resize(k, symbols[0]);
        pattern.reverse();
        Ok(pattern)
    }

    /// Counts of every k-mer of `text`, indexed by `pattern_to_number` (AA.., AC.., AG.., ...).
    pub fn frequency_array<T: AsRef<[u8]>>(text: T, k: usize) -> Result<Vec<usize>> {
        frequency_array_approx(text, k, 0)
    }

    /// Like `frequency_array`, but each window also credits every k-mer within Hamming distance
    /// `max_distance` of it.
    pub fn frequency_array_approx<T: AsRef<[u8]>>(
        text: T,
        k: usize,
        max_distance: usize,
    ) -> Result<Vec<usize>> {
        let text = text.as_ref();
        if k == 0 || k > MAX_DENSE_K {
            return Err(Error::InvalidInput(format!(
                "frequency arrays need 1 <= k <= {}, got {}",
                MAX_DENSE_K, k
            )));
        }
        let size = pattern_space(Alphabet::DNA.len(), k)
            .ok_or_else(|| Error::InvalidInput(format!("4^{} does not fit in memory", k)))?;
        Alphabet::DNA.validate(text)?;
        let mut frequencies = vec![0usize; size];
        for kmer in text.windows(k) {
            if max_distance == 0 {
                frequencies[pattern_to_number(kmer)? as usize] += 1;
                continue;
            }
            for neighbor in neighbors_unchecked(kmer, &Alphabet::DNA, max_distance) {
                frequencies[pattern_to_number(&neighbor)? as usize] += 1;
            }
        }
        Ok(frequencies)
    }

}

pub mod skew {
    /// Running count of G minus C over the prefixes of `text`; entry `i` covers the first `i`
    /// symbols, so the result has `text.len() + 1` entries and starts at 0.
    pub fn skew<T: AsRef<[u8]>>(text: T) -> Vec<isize> {
        let text = text.as_ref();
        let mut steps = Vec::with_capacity(text.len() + 1);
        let mut val = 0isize;
        steps.push(val);
        for c in text {
            val += match c {
                b'c' | b'C' => -1isize,
                b'g' | b'G' => 1isize,
                _ => 0isize,
            };
            steps.push(val);
        }
        steps
    }

    /// Every prefix length at which the skew reaches its minimum.
    pub fn minimum_skew<T: AsRef<[u8]>>(text: T) -> Vec<usize> {
        let steps = skew(text);
        let min_val = steps.iter().copied().min().unwrap_or(0);
        steps
            .into_iter()
            .enumerate()
            .filter(|(_, val)| *val == min_val)
            .map(|(i, _)| i)
            .collect()
    }

}

pub mod mismatches {
    use super::alphabet::Alphabet;
    use crate::{Error, Result};

    /// Mismatch count of two slices of equal length.
    pub(crate) fn dist(a: &[u8], b: &[u8]) -> usize {
        debug_assert_eq!(a.len(), b.len());
        a.iter().zip(b).filter(|(x, y)| x != y).count()
    }

    pub fn hamming_distance<A: AsRef<[u8]>, B: AsRef<[u8]>>(a: A, b: B) -> Result<usize> {
        let a = a.as_ref();
        let b = b.as_ref();
        if a.len() != b.len() {
            return Err(Error::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        Ok(dist(a, b))
    }

    /// All DNA strings within Hamming distance `max_distance` of `pattern`, `pattern` included.
    pub fn neighbors<P: AsRef<[u8]>>(pattern: P, max_distance: usize) -> Result<Vec<Vec<u8>>> {
        neighbors_with(pattern, &Alphabet::DNA, max_distance)
    }

    /// All strings over `alphabet` within Hamming distance `max_distance` of `pattern`. For an
    /// alphabet of size `a` the result has exactly `sum(C(k, i) * (a - 1)^i, i = 0..=d)`
    /// members, with no duplicates.
    pub fn neighbors_with<P: AsRef<[u8]>>(
        pattern: P,
        alphabet: &Alphabet,
        max_distance: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let pattern = pattern.as_ref();
        alphabet.validate(pattern)?;
        Ok(neighbors_unchecked(pattern, alphabet, max_distance))
    }

    /// Grows the neighborhood one position at a time from the right end of `pattern`. A partial
    /// neighbor that is still closer than `max_distance` to its suffix may take any symbol at
    /// the next position; one that has spent its budget keeps the original symbol. Partial
    /// neighbors are stored reversed so that extending them is a push.
    pub(crate) fn neighbors_unchecked(
        pattern: &[u8],
        alphabet: &Alphabet,
        max_distance: usize,
    ) -> Vec<Vec<u8>> {
        let n = pattern.len();
        if max_distance == 0 || n == 0 {
            return vec![pattern.to_vec()];
        }
        let symbols = alphabet.symbols();
        let last = pattern[n - 1];
        // (reversed suffix neighbor, distance to the suffix)
        let mut frontier: Vec<(Vec<u8>, usize)> = symbols
            .iter()
            .map(|s| {
                let mut rev = Vec::with_capacity(n);
                rev.push(*s);
                (rev, usize::from(*s != last))
            })
            .collect();
        for &first in pattern[..n - 1].iter().rev() {
            let mut next = Vec::with_capacity(frontier.len() * symbols.len());
            for (rev, distance) in frontier {
                if distance < max_distance {
                    for s in symbols {
                        let mut extended = rev.clone();
                        extended.push(*s);
                        next.push((extended, distance + usize::from(*s != first)));
                    }
                } else {
                    let mut extended = rev;
                    extended.push(first);
                    next.push((extended, distance));
                }
            }
            frontier = next;
        }
        frontier
            .into_iter()
            .map(|(mut rev, _)| {
                rev.reverse();
                rev
            })
            .collect()
    }

    /// Start offsets of every window of `text` within Hamming distance `max_distance` of
    /// `pattern`.
    pub fn find_pattern_approx<T: AsRef<[u8]>, P: AsRef<[u8]>>(
        text: T,
        pattern: P,
        max_distance: usize,
    ) -> Vec<usize> {
        let text = text.as_ref();
        let pattern = pattern.as_ref();
        if pattern.is_empty() || text.len() < pattern.len() {
            return Vec::new();
        }
        text.windows(pattern.len())
            .enumerate()
            .filter(|(_, kmer)| dist(kmer, pattern) <= max_distance)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn approximate_pattern_count<T: AsRef<[u8]>, P: AsRef<[u8]>>(
        text: T,
        pattern: P,
        max_distance: usize,
    ) -> usize {
        find_pattern_approx(text, pattern, max_distance).len()
    }

    #[cfg(test)]
    mod tests {
        use super::{super::codec::number_to_pattern, *};
        use std::collections::HashSet;

        fn binomial(n: usize, k: usize) -> usize {
            (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
        }

        fn ball_size(k: usize, d: usize) -> usize {
            (0..=d.min(k))
                .map(|i| binomial(k, i) * 3usize.pow(i as u32))
                .sum()
        }

        #[test]
        fn test_hamming_distance() {
            assert_eq!(hamming_distance("GGGCCGTTGGT", "GGACCGTTGAC").unwrap(), 3);
            assert_eq!(hamming_distance("ACGT", "ACGT").unwrap(), 0);
            assert_eq!(
                hamming_distance("ACGT", "ACG"),
                Err(Error::LengthMismatch { left: 4, right: 3 })
            );
        }

        #[test]
        fn test_hamming_distance_symmetry() {
            for a in 0..64 {
                let p = number_to_pattern(a, 3).unwrap();
                assert_eq!(hamming_distance(&p, &p).unwrap(), 0);
                for b in 0..64 {
                    let q = number_to_pattern(b, 3).unwrap();
                    assert_eq!(
                        hamming_distance(&p, &q).unwrap(),
                        hamming_distance(&q, &p).unwrap()
                    );
                }
            }
        }

        #[test]
        fn test_neighbors() {
            let actual: HashSet<Vec<u8>> = neighbors("AG", 1).unwrap().into_iter().collect();
            let expected: HashSet<Vec<u8>> = [b"AG", b"CG", b"GG", b"TG", b"AA", b"AC", b"AT"]
                .iter()
                .map(|n| n.to_vec())
                .collect();
            assert_eq!(actual, expected);
            assert_eq!(neighbors("ACG", 0).unwrap(), vec![b"ACG".to_vec()]);
            assert_eq!(neighbors("", 2).unwrap(), vec![Vec::<u8>::new()]);
            assert!(neighbors("ANG", 1).is_err());
        }

        #[test]
        fn test_neighbors_size() {
            for k in 1..=6 {
                let pattern = number_to_pattern(1234 % 4u64.pow(k as u32), k).unwrap();
                for d in 0..=3 {
                    let ball = neighbors(&pattern, d).unwrap();
                    let unique: HashSet<&Vec<u8>> = ball.iter().collect();
                    assert_eq!(ball.len(), ball_size(k, d), "k={} d={}", k, d);
                    assert_eq!(unique.len(), ball.len());
                    assert!(unique.contains(&pattern));
                    assert!(ball.iter().all(|n| dist(n, &pattern) <= d));
                }
            }
        }

        #[test]
        fn test_neighbors_binary_alphabet() {
            let binary = Alphabet::new(b"01").unwrap();
            let ball = neighbors_with("000", &binary, 1).unwrap();
            assert_eq!(ball.len(), 4);
            assert_eq!(neighbors_with("000", &binary, 3).unwrap().len(), 8);
        }

        #[test]
        fn test_find_pattern_approx() {
            let text = "CGCCCGAATCCAGAACGCATTCCCATATTTCGGGACCACTGGCCTCCACGGTACGGACGTCAATCAAATGCCTAGCGGCTTGTGGTTTCTCCTACGCTCC";
            assert_eq!(
                find_pattern_approx(text, "ATTCTGGA", 3),
                vec![6, 7, 26, 27, 78]
            );
            assert_eq!(approximate_pattern_count("TTTAGAGCCTTCAGAGG", "GAGG", 2), 4);
            assert!(find_pattern_approx("ACG", "", 1).is_empty());
        }
    }
}
