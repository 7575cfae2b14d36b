/// 校验结果：`valid` 为假时 `errors` 至少包含一条
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut errors: Vec<String> = errors.into_iter().map(Into::into).collect();
        if errors.is_empty() {
            errors.push("invalid payload".to_string());
        }
        Self {
            valid: false,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// 负载校验器（业务规则由调用方提供）
pub trait Validator<P: ?Sized>: Send + Sync {
    fn validate(&self, payload: &P) -> ValidationResult;
}

impl<P, F> Validator<P> for F
where
    P: ?Sized,
    F: Fn(&P) -> ValidationResult + Send + Sync,
{
    fn validate(&self, payload: &P) -> ValidationResult {
        self(payload)
    }
}

/// 总是通过
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<P: ?Sized> Validator<P> for AcceptAll {
    fn validate(&self, _payload: &P) -> ValidationResult {
        ValidationResult::ok()
    }
}
