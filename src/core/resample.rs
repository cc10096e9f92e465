//! Sample-rate conversion of decoded PCM to a signature rate.

/// Resamples mono PCM from `from_hz` to `to_hz` by linear interpolation.
///
/// Output sample `i` sits at input position `i * from_hz / to_hz`, computed
/// exactly in integers. The output holds `len * to_hz / from_hz` samples,
/// rounded down. Equal rates return the input unchanged.
pub fn resample_pcm(input: &[i16], from_hz: u32, to_hz: u32) -> Vec<i16> {
    if from_hz == to_hz {
        return input.to_vec();
    }
    if from_hz == 0 || to_hz == 0 {
        return Vec::new();
    }

    let (from, to) = (from_hz as u64, to_hz as u64);
    let out_len = (input.len() as u64 * to / from) as usize;
    (0..out_len as u64)
        .map(|i| {
            let position = i * from;
            let index = (position / to) as usize;
            let frac = (position % to) as f64 / to as f64;
            let a = input[index] as f64;
            let b = input.get(index + 1).map_or(a, |&s| s as f64);
            (a + (b - a) * frac).round() as i16
        })
        .collect()
}
