//! Memory address type.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Strongly typed address in the inspected process
///
/// Wraps a `u64` so that addresses cannot be confused with byte counts or
/// array extents, which this crate juggles a lot of.
///
/// ## Example
///
/// ```rust
/// use memplot_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// let end = addr + 64;
/// assert_eq!(end.value(), 0x1040);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add a byte offset, returning `None` on overflow
    ///
    /// ```rust
    /// use memplot_core::types::Address;
    ///
    /// assert_eq!(Address::from(0x1000).checked_add(0x10), Some(Address::from(0x1010)));
    /// assert_eq!(Address::from(u64::MAX).checked_add(1), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Distance in bytes from `base` to this address, if it is not below `base`
    pub fn offset_from(self, base: Address) -> Option<u64>
    {
        self.0.checked_sub(base.0)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

/// Parses `0x`-prefixed hex or plain decimal, the two forms users type on a
/// debugger command line.
impl FromStr for Address
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            u64::from_str_radix(&hex.replace('_', ""), 16)
        } else {
            trimmed.replace('_', "").parse::<u64>()
        };
        parsed
            .map(Address)
            .map_err(|err| format!("invalid address '{s}': {err}"))
    }
}
