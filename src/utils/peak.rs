use crate::float::Float;

struct Point<T: Float> {
    x: T,
    y: T,
}

/// Index of the first dip of `arr` below `threshold`: the first `t >= 2`
/// with `arr[t] < threshold` and `arr[t] < arr[t + 1]`.
pub fn first_dip_below<T: Float>(arr: &[T], threshold: T) -> Option<usize> {
    if arr.len() < 4 {
        return None;
    }
    (2..arr.len() - 1).find(|&t| arr[t] < threshold && arr[t] < arr[t + 1])
}

/// Index of the smallest value of `arr`, ignoring index 0.
pub fn min_index<T: Float>(arr: &[T]) -> Option<usize> {
    arr.iter()
        .enumerate()
        .skip(1)
        .fold(None, |best: Option<(usize, T)>, (i, &v)| match best {
            Some((_, b)) if b <= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Refine the position of the extremum at `idx` by fitting a parabola through
/// it and its two neighbours. Falls back to `idx` at the edges or when the
/// three points are collinear.
pub fn refine_extremum<T: Float>(data: &[T], idx: usize) -> T {
    let at = T::from_usize(idx).unwrap_or_else(T::zero);
    if idx == 0 || idx + 1 >= data.len() {
        return at;
    }
    let point = quadratic_interpolation(
        Point {
            x: at - T::one(),
            y: data[idx - 1],
        },
        Point {
            x: at,
            y: data[idx],
        },
        Point {
            x: at + T::one(),
            y: data[idx + 1],
        },
    );
    if point.x.is_finite() {
        point.x
    } else {
        at
    }
}

fn quadratic_interpolation<T: Float>(
    left: Point<T>,
    center: Point<T>,
    right: Point<T>,
) -> Point<T> {
    let two = T::one() + T::one();
    let half = T::one() / two;
    let shift = half * (right.y - left.y) / (two * center.y - left.y - right.y);
    let x = center.x + shift;
    let y = center.y + half * half * (right.y - left.y) * shift;
    Point { x, y }
}
