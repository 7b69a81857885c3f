/*!
 * Address List Codec
 * Packing and unpacking of multi-homed sockaddr record lists
 */

use bytes::BytesMut;

use crate::core::errors::fatal;
use crate::core::value::Buffer;

/// Fixed on-wire length of one AF_INET record (`struct sockaddr_in`).
pub const SOCKADDR_IN_LEN: usize = 16;

/// Extra capacity reserved beyond the immediate requirement whenever the
/// pack buffer must grow, amortizing reallocation across repeated appends.
const GROW_SLACK: usize = 128;

/// Address family of a raw sockaddr record: the first two bytes, native
/// endian. Records too short to carry a family are a contract violation.
fn family_of(record: &[u8]) -> u16 {
    if record.len() < 2 {
        fatal("sockaddr record too short to carry an address family");
    }
    u16::from_ne_bytes([record[0], record[1]])
}

/// Fixed record length for a supported address family.
fn record_len(family: u16) -> usize {
    if family == libc::AF_INET as u16 {
        SOCKADDR_IN_LEN
    } else {
        fatal(&format!("unsupported address family: {family}"));
    }
}

/// Pack an ordered sequence of fixed-size address records into one
/// contiguous buffer, the shape the multi-address syscalls consume.
///
/// Record order is preserved. A record whose length disagrees with its
/// declared family, or whose family is unsupported, terminates the process.
pub fn pack(records: &[Buffer]) -> BytesMut {
    let mut packed = BytesMut::new();
    for record in records {
        let bytes = record.borrow();
        let len = record_len(family_of(&bytes));
        if bytes.len() != len {
            fatal(&format!(
                "sockaddr record length {} does not match its family",
                bytes.len()
            ));
        }
        if packed.len() + len > packed.capacity() {
            packed.reserve(len + GROW_SLACK);
        }
        packed.extend_from_slice(&bytes);
    }
    packed
}

/// Unpack a kernel-returned contiguous buffer of `count` records into
/// discrete per-record buffers, sized per record by address family.
pub fn unpack(packed: &[u8], count: usize) -> Vec<Buffer> {
    let mut records = Vec::with_capacity(count);
    let mut offset = 0;
    for _ in 0..count {
        if packed.len() < offset + 2 {
            fatal("truncated sockaddr list from the kernel");
        }
        let len = record_len(u16::from_ne_bytes([packed[offset], packed[offset + 1]]));
        if packed.len() < offset + len {
            fatal("truncated sockaddr list from the kernel");
        }
        records.push(Buffer::from_vec(packed[offset..offset + len].to_vec()));
        offset += len;
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inet_record(port: u16, addr: [u8; 4]) -> Buffer {
        let mut record = vec![0u8; SOCKADDR_IN_LEN];
        record[..2].copy_from_slice(&(libc::AF_INET as u16).to_ne_bytes());
        record[2..4].copy_from_slice(&port.to_be_bytes());
        record[4..8].copy_from_slice(&addr);
        Buffer::from_vec(record)
    }

    #[test]
    fn three_records_pack_into_one_contiguous_buffer() {
        let records = [
            inet_record(9899, [10, 0, 0, 1]),
            inet_record(9899, [10, 0, 0, 2]),
            inet_record(9899, [192, 168, 1, 1]),
        ];
        let packed = pack(&records);
        assert_eq!(packed.len(), 3 * SOCKADDR_IN_LEN);
        assert_eq!(&packed[..SOCKADDR_IN_LEN], &records[0].to_vec()[..]);
        assert_eq!(
            &packed[2 * SOCKADDR_IN_LEN..],
            &records[2].to_vec()[..]
        );
    }

    #[test]
    fn empty_list_packs_to_empty_buffer() {
        assert!(pack(&[]).is_empty());
        assert!(unpack(&[], 0).is_empty());
    }

    #[test]
    #[should_panic(expected = "unsupported address family")]
    fn packing_an_unknown_family_is_fatal() {
        let mut record = vec![0u8; SOCKADDR_IN_LEN];
        record[..2].copy_from_slice(&(libc::AF_INET6 as u16).to_ne_bytes());
        pack(&[Buffer::from_vec(record)]);
    }

    #[test]
    #[should_panic(expected = "does not match its family")]
    fn packing_a_short_record_is_fatal() {
        let mut record = vec![0u8; 8];
        record[..2].copy_from_slice(&(libc::AF_INET as u16).to_ne_bytes());
        pack(&[Buffer::from_vec(record)]);
    }

    #[test]
    #[should_panic(expected = "truncated sockaddr list")]
    fn unpacking_past_the_buffer_end_is_fatal() {
        let packed = pack(&[inet_record(1, [127, 0, 0, 1])]);
        unpack(&packed, 2);
    }

    proptest! {
        #[test]
        fn pack_unpack_round_trip(
            endpoints in prop::collection::vec((any::<u16>(), any::<[u8; 4]>()), 0..16)
        ) {
            let records: Vec<Buffer> = endpoints
                .iter()
                .map(|(port, addr)| inet_record(*port, *addr))
                .collect();
            let packed = pack(&records);
            let unpacked = unpack(&packed, records.len());
            prop_assert_eq!(unpacked.len(), records.len());
            for (original, copy) in records.iter().zip(&unpacked) {
                prop_assert_eq!(original.to_vec(), copy.to_vec());
            }
        }
    }
}
