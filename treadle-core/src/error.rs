use std::fmt;

/// Main error type for Treadle operations
#[derive(Debug, Clone)]
pub enum TreadleError {
    /// Startup-time registration errors
    RegistrationError {
        message: String,
    },

    /// Dispatch against a method no binding was registered for
    UnknownMethod {
        method: String,
    },

    /// Runtime execution errors
    ExecutionError {
        message: String,
        cause: Option<Box<TreadleError>>,
    },

    /// Argument extraction and conversion errors
    ArgumentError {
        expected: String,
        found: String,
    },

    /// Calendar schedule errors
    ScheduleError {
        message: String,
        expression: Option<String>,
    },

    InterceptorError {
        error: InterceptorFault,
        interceptor_stack: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub enum InterceptorFault {
    // Raised by an interceptor's own logic
    Interceptor {
        name: String,
        message: String,
    },
    // Raised by the target operation at the end of the chain
    Target {
        name: String,
        message: String,
    },
}

/// Result type alias for Treadle operations
pub type TreadleResult<T> = Result<T, TreadleError>;

impl TreadleError {
    /// Create a registration error
    pub fn registration(message: impl Into<String>) -> Self {
        Self::RegistrationError {
            message: message.into(),
        }
    }

    /// Create an unknown-method error
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::ExecutionError {
            message: message.into(),
            cause: None,
        }
    }

    /// Create an execution error with cause
    pub fn execution_with_cause(message: impl Into<String>, cause: TreadleError) -> Self {
        Self::ExecutionError {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Create an argument error
    pub fn argument(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ArgumentError {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a schedule error
    pub fn schedule(message: impl Into<String>) -> Self {
        Self::ScheduleError {
            message: message.into(),
            expression: None,
        }
    }

    /// Create a schedule error carrying the offending expression
    pub fn schedule_expr(message: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::ScheduleError {
            message: message.into(),
            expression: Some(expression.into()),
        }
    }

    /// Create an interceptor error raised by an interceptor
    pub fn interceptor_fault(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InterceptorError {
            error: InterceptorFault::Interceptor {
                name: name.into(),
                message: message.into(),
            },
            interceptor_stack: Vec::new(),
        }
    }

    /// Create an interceptor error raised by the target operation
    pub fn target_fault(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InterceptorError {
            error: InterceptorFault::Target {
                name: name.into(),
                message: message.into(),
            },
            interceptor_stack: Vec::new(),
        }
    }

    /// Record that the error passed back through the named interceptor.
    /// The stack reads innermost first.
    pub fn through_interceptor(self, name: impl Into<String>) -> Self {
        match self {
            Self::InterceptorError {
                error,
                mut interceptor_stack,
            } => {
                interceptor_stack.push(name.into());
                Self::InterceptorError {
                    error,
                    interceptor_stack,
                }
            }
            other => other,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Self::ExecutionError { message, .. } = &mut self {
            *message = format!("{}: {}", context.into(), message);
        }
        self
    }
}

impl fmt::Display for TreadleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistrationError { message } => {
                write!(f, "Registration error: {message}")
            }
            Self::UnknownMethod { method } => {
                write!(f, "Unknown method '{method}': no binding registered")
            }
            Self::ExecutionError { message, cause } => {
                write!(f, "Execution error: {message}")?;
                if let Some(cause) = cause {
                    write!(f, " (caused by: {cause})")?;
                }
                Ok(())
            }
            Self::ArgumentError { expected, found } => {
                write!(f, "Argument error: expected {expected}, found {found}")
            }
            Self::ScheduleError {
                message,
                expression,
            } => {
                if let Some(expression) = expression {
                    write!(f, "Schedule error in '{expression}': {message}")
                } else {
                    write!(f, "Schedule error: {message}")
                }
            }
            Self::InterceptorError {
                error,
                interceptor_stack,
            } => {
                match error {
                    InterceptorFault::Interceptor { name, message } => {
                        write!(
                            f,
                            "Interceptor error: the interceptor '{name}' failed with '{message}'"
                        )?;
                    }
                    InterceptorFault::Target { name, message } => {
                        write!(
                            f,
                            "Interceptor error: the target operation '{name}' failed with '{message}'"
                        )?;
                    }
                }
                if !interceptor_stack.is_empty() {
                    write!(
                        f,
                        ". Interceptors traversed on the way out: [ {} ]",
                        interceptor_stack.join(", ")
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for TreadleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ExecutionError {
                cause: Some(cause), ..
            } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

// Conversion from String
impl From<String> for TreadleError {
    fn from(error: String) -> Self {
        Self::execution(error)
    }
}

// Conversion from &str
impl<'a> From<&'a str> for TreadleError {
    fn from(error: &'a str) -> Self {
        Self::execution(error)
    }
}

// Macro for creating execution errors
#[macro_export]
macro_rules! treadle_error {
    ($msg:expr) => {
        Err($crate::error::TreadleError::execution($msg))
    };
    ($fmt:expr, $($arg:tt)*) => {
        Err($crate::error::TreadleError::execution(format!($fmt, $($arg)*)))
    };
}

// Macro for creating registration errors
#[macro_export]
macro_rules! registration_error {
    ($msg:expr) => {
        Err($crate::error::TreadleError::registration($msg))
    };
    ($fmt:expr, $($arg:tt)*) => {
        Err($crate::error::TreadleError::registration(format!($fmt, $($arg)*)))
    };
}
