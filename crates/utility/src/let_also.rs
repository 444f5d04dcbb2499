/// Kotlin style scope function for chaining on owned values.
pub trait LetAlso: Sized {
    fn let_owned<R, F: FnOnce(Self) -> R>(self, f: F) -> R {
        f(self)
    }
}

impl<T> LetAlso for T {}

#[cfg(test)]
mod tests {
    use super::LetAlso;

    #[test]
    fn let_owned_passes_value() {
        let result: Result<Vec<i32>, ()> = vec![1, 2].let_owned(Ok);
        assert_eq!(result, Ok(vec![1, 2]));
    }
}
