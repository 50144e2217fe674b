use flowgen_dag::VERTEX_COUNT;

/// Split `n` into four pieces by rounding quarter points:
/// `u_i = round((i+1)·n/4)`, `d_i = u_i − u_{i−1}`. Rounding is half away
/// from zero, which biases the tail pieces for small `n`.
pub fn quarters(n: u32) -> [u32; VERTEX_COUNT] {
    let mut out = [0u32; VERTEX_COUNT];
    let mut cdf = 0.0f64;
    let mut prev = 0u32;
    for slot in out.iter_mut() {
        cdf += 1.0 / VERTEX_COUNT as f64;
        let u = (cdf * f64::from(n)).round() as u32;
        *slot = u - prev;
        prev = u;
    }
    out
}
