use std::ffi::CStr;
use std::ptr;

use fossil_abi::regex_abi::{
    FOSSIL_REGEX_LIMIT_PATTERN_LENGTH, FOSSIL_REGEX_STATUS_FAILURE, FOSSIL_REGEX_STATUS_SUCCESS,
    fossil_regex_create, fossil_regex_get_matched_substring, fossil_regex_match,
    fossil_regex_match_and_extract, fossil_regex_reset, fossil_regex_t,
};

fn text_at(ptr: *const std::ffi::c_char) -> &'static str {
    assert!(!ptr.is_null());
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
}

#[test]
fn create_validates_arguments() {
    let mut re = fossil_regex_t::new();
    unsafe {
        assert_eq!(
            fossil_regex_create(ptr::null_mut(), c"a".as_ptr()),
            FOSSIL_REGEX_STATUS_FAILURE
        );
        assert_eq!(
            fossil_regex_create(&mut re, ptr::null()),
            FOSSIL_REGEX_STATUS_FAILURE
        );
        assert_eq!(fossil_regex_create(&mut re, c"".as_ptr()), FOSSIL_REGEX_STATUS_FAILURE);
        assert_eq!(
            fossil_regex_create(&mut re, c"test".as_ptr()),
            FOSSIL_REGEX_STATUS_SUCCESS
        );
    }
    assert_eq!(text_at(re.pattern), "test");
    assert!(re.matched_substring.is_null());
}

#[test]
fn create_length_boundary() {
    let mut ok = vec![b'a'; FOSSIL_REGEX_LIMIT_PATTERN_LENGTH - 1];
    ok.push(0);
    let mut too_long = vec![b'a'; FOSSIL_REGEX_LIMIT_PATTERN_LENGTH];
    too_long.push(0);

    let mut re = fossil_regex_t::new();
    unsafe {
        assert_eq!(
            fossil_regex_create(&mut re, ok.as_ptr().cast()),
            FOSSIL_REGEX_STATUS_SUCCESS
        );
        assert_eq!(
            fossil_regex_create(&mut re, too_long.as_ptr().cast()),
            FOSSIL_REGEX_STATUS_FAILURE
        );
    }
}

#[test]
fn match_records_borrowed_text() {
    let mut re = fossil_regex_t::new();
    let hit = c"pattern";
    unsafe {
        fossil_regex_create(&mut re, c"pat.ern".as_ptr());
        assert_eq!(fossil_regex_match(&mut re, hit.as_ptr()), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_get_matched_substring(&mut re), hit.as_ptr());

        assert_eq!(
            fossil_regex_match(&mut re, c"no match here".as_ptr()),
            FOSSIL_REGEX_STATUS_FAILURE
        );
        assert!(fossil_regex_get_matched_substring(&mut re).is_null());
        assert_eq!(
            fossil_regex_match(&mut re, ptr::null()),
            FOSSIL_REGEX_STATUS_FAILURE
        );
    }
}

#[test]
fn extract_is_anchored() {
    let mut re = fossil_regex_t::new();
    unsafe {
        fossil_regex_create(&mut re, c"extract.*".as_ptr());
        let got = fossil_regex_match_and_extract(&mut re, c"extract this text".as_ptr());
        assert_eq!(text_at(got), "extract this text");

        fossil_regex_create(&mut re, c"extract".as_ptr());
        assert!(fossil_regex_match_and_extract(&mut re, c"extract this text".as_ptr()).is_null());
        assert!(fossil_regex_match_and_extract(ptr::null_mut(), c"x".as_ptr()).is_null());
    }
}

#[test]
fn reset_is_idempotent_and_blocks_matching() {
    let mut re = fossil_regex_t::new();
    unsafe {
        fossil_regex_create(&mut re, c"reset".as_ptr());
        fossil_regex_match(&mut re, c"reset".as_ptr());
        fossil_regex_reset(&mut re);
        assert!(re.pattern.is_null());
        assert!(re.matched_substring.is_null());
        fossil_regex_reset(&mut re);
        fossil_regex_reset(ptr::null_mut());
        assert_eq!(
            fossil_regex_match(&mut re, c"reset".as_ptr()),
            FOSSIL_REGEX_STATUS_FAILURE
        );
        assert!(fossil_regex_get_matched_substring(ptr::null_mut()).is_null());
    }
}

#[cfg(unix)]
#[test]
fn caller_lock_serializes_shared_record() {
    use fossil_abi::regex_abi::{
        fossil_regex_destroy, fossil_regex_lock, fossil_regex_trylock, fossil_regex_unlock,
    };

    struct Shared(*mut fossil_regex_t);
    unsafe impl Send for Shared {}
    unsafe impl Sync for Shared {}

    let re = Box::into_raw(Box::new(fossil_regex_t::new()));
    unsafe { fossil_regex_create(re, c"t.*".as_ptr()) };
    let shared = std::sync::Arc::new(Shared(re));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = std::sync::Arc::clone(&shared);
            std::thread::spawn(move || {
                let re = shared.0;
                for _ in 0..200 {
                    unsafe {
                        assert_eq!(fossil_regex_lock(re), FOSSIL_REGEX_STATUS_SUCCESS);
                        let text = c"threaded";
                        assert_eq!(fossil_regex_match(re, text.as_ptr()), FOSSIL_REGEX_STATUS_SUCCESS);
                        assert_eq!(fossil_regex_get_matched_substring(re), text.as_ptr());
                        assert_eq!(fossil_regex_unlock(re), FOSSIL_REGEX_STATUS_SUCCESS);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    unsafe {
        assert_eq!(fossil_regex_lock(re), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_trylock(re), FOSSIL_REGEX_STATUS_FAILURE);
        assert_eq!(fossil_regex_unlock(re), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_destroy(re), FOSSIL_REGEX_STATUS_SUCCESS);
        assert!((*re).pattern.is_null());
        drop(Box::from_raw(re));
    }
}

#[cfg(unix)]
#[test]
fn create_reinitialises_mutex() {
    use std::mem::MaybeUninit;

    use fossil_abi::regex_abi::{
        fossil_regex_destroy, fossil_regex_lock, fossil_regex_trylock, fossil_regex_unlock,
    };

    let mut re = fossil_regex_t::new();
    unsafe {
        assert_eq!(fossil_regex_create(&mut re, c"a*".as_ptr()), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_destroy(&mut re), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_create(&mut re, c"a*".as_ptr()), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_lock(&mut re), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_unlock(&mut re), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_destroy(&mut re), FOSSIL_REGEX_STATUS_SUCCESS);
    }

    // A record declared on the C side without an initializer.
    let mut raw = MaybeUninit::<fossil_regex_t>::uninit();
    let re = raw.as_mut_ptr();
    unsafe {
        ptr::write_bytes(re, 0xAB, 1);
        assert_eq!(fossil_regex_create(re, c"b.".as_ptr()), FOSSIL_REGEX_STATUS_SUCCESS);
        assert!((*re).matched_substring.is_null());
        assert_eq!(fossil_regex_trylock(re), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_trylock(re), FOSSIL_REGEX_STATUS_FAILURE);
        assert_eq!(fossil_regex_unlock(re), FOSSIL_REGEX_STATUS_SUCCESS);
        assert_eq!(fossil_regex_destroy(re), FOSSIL_REGEX_STATUS_SUCCESS);
    }
}
