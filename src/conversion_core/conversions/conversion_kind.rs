use std::fmt;

/// How an expression is carried across a type boundary in the target language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    // Facts were missing or the types are unrelated, the expression is left alone
    Unknown,

    // Nothing to emit, the target applies the same conversion implicitly
    Identity,

    // A cast that can never lose information
    NonDestructiveCast,

    // A cast the target allows but that may truncate or throw
    DestructiveCast,

    // A call to a runtime conversion helper
    RuntimeConversion,

    // Enum to string: cast to the underlying type, then convert
    CastThenEnum,

    // Value to enum: convert to the underlying type, then cast
    EnumThenCast,

    // Nullable Boolean to Boolean: compare with true
    NullableToBooleanCompare,

    // String to Char array: call ToCharArray
    StringToCharArrayCall,
}

impl ConversionKind {
    pub fn is_cast(self) -> bool {
        matches!(
            self,
            ConversionKind::NonDestructiveCast | ConversionKind::DestructiveCast
        )
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
