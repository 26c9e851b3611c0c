//! Channel availability for an identifier kind

use vc_shared::IdentifierKind;

use crate::domain::entities::Channel;

/// Whether `channel` can be used by someone who identified with `kind`
pub fn is_channel_available(kind: IdentifierKind, channel: Channel) -> bool {
    match channel {
        Channel::Password | Channel::Totp | Channel::RecoveryCode => true,
        Channel::Sms | Channel::Whatsapp => kind == IdentifierKind::Phone,
        Channel::EmailOtp => kind == IdentifierKind::Email,
    }
}

/// Selectable channels, in the order of `allowed`
pub fn available_channels(kind: IdentifierKind, allowed: &[Channel]) -> Vec<Channel> {
    let mut available = Vec::with_capacity(allowed.len());
    for &channel in allowed {
        if is_channel_available(kind, channel) && !available.contains(&channel) {
            available.push(channel);
        }
    }
    available
}
