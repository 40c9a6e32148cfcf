use crypto_bigint::{Uint, nlimbs};
use fv_encryptor::crypto::SeededRandomFactory;
use fv_encryptor::{
    BigPoly, EncryptionError, EncryptionParameters, Encryptor, ErrorKind, KeyGenerator, PolyArray,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;

const LIMBS: usize = nlimbs!(128);
const Q: u64 = 12289;

fn setup() -> (EncryptionParameters<LIMBS>, Encryptor<LIMBS>) {
    let params = EncryptionParameters::builder()
        .degree(4)
        .coeff_modulus(&[Q])
        .plain_modulus(16)
        .random_generator(Arc::new(SeededRandomFactory::new(2024)))
        .build();
    let (_, public_key) = KeyGenerator::new(&params).unwrap().generate();
    let encryptor = Encryptor::new(&params, &public_key).unwrap();
    (params, encryptor)
}

fn snapshot(array: &PolyArray<'_, LIMBS>) -> Vec<Vec<Uint<LIMBS>>> {
    (0..array.size()).map(|i| array.poly(i).to_vec()).collect()
}

#[test]
fn out_of_range_coefficient_leaves_destination_unchanged() {
    let (_, mut encryptor) = setup();
    let mut destination = encryptor
        .encrypt(&BigPoly::from_u64s(&[1, 2, 3, 4], 5).unwrap())
        .unwrap();
    let before = snapshot(&destination);

    let plain = BigPoly::from_u64s(&[1, 16, 0, 0], 5).unwrap();
    let error = encryptor.encrypt_into(&plain, &mut destination).unwrap_err();
    assert_eq!(error, EncryptionError::PlaintextCoefficientTooLarge { index: 1 });
    assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    assert_eq!(snapshot(&destination), before);
}

#[test]
fn too_many_significant_coefficients_leaves_destination_unchanged() {
    let (_, mut encryptor) = setup();
    let mut destination = PolyArray::new(1, 3, 7);
    destination.poly_mut(0)[2] = Uint::from_u64(42);

    let plain = BigPoly::from_u64s(&[1, 0, 0, 0, 1], 5).unwrap();
    let error = encryptor.encrypt_into(&plain, &mut destination).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    assert!(destination.has_shape(1, 3, 7));
    assert_eq!(destination.poly(0)[2], Uint::from_u64(42));
}

#[test]
fn correctly_shaped_destination_is_reused() {
    let (_, mut encryptor) = setup();
    let plain = BigPoly::from_u64s(&[7, 0, 1, 0], 5).unwrap();
    let mut destination = PolyArray::new(2, 4, 14);
    let c0 = destination.poly(0).as_ptr();
    let c1 = destination.poly(1).as_ptr();

    encryptor.encrypt_into(&plain, &mut destination).unwrap();
    assert_eq!(destination.poly(0).as_ptr(), c0);
    assert_eq!(destination.poly(1).as_ptr(), c1);
    assert!(destination.poly(0).iter().any(|c| *c != Uint::ZERO));
}

#[test]
fn misshaped_owned_destination_is_resized() {
    let (_, mut encryptor) = setup();
    let mut destination = PolyArray::new(3, 9, 30);
    encryptor
        .encrypt_into(&BigPoly::from_u64s(&[3], 5).unwrap(), &mut destination)
        .unwrap();
    assert!(destination.has_shape(2, 4, 14));
}

#[test]
fn alias_destination_that_needs_resizing_is_a_logic_error() {
    let (_, mut encryptor) = setup();
    let mut shared = vec![Uint::<LIMBS>::from_u64(5); 6];
    let before = shared.clone();
    {
        let mut destination = PolyArray::alias(&mut shared, 2, 3, 14).unwrap();
        let error = encryptor
            .encrypt_into(&BigPoly::from_u64s(&[1], 5).unwrap(), &mut destination)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::LogicError);
    }
    assert_eq!(shared, before);
}

#[test]
fn alias_destination_with_matching_shape_is_written_in_place() {
    let (_, mut encryptor) = setup();
    let mut shared = vec![Uint::<LIMBS>::ZERO; 8];
    {
        let mut destination = PolyArray::alias(&mut shared, 2, 4, 14).unwrap();
        encryptor
            .encrypt_into(&BigPoly::from_u64s(&[1, 1, 1, 1], 5).unwrap(), &mut destination)
            .unwrap();
    }
    assert!(shared.iter().any(|c| *c != Uint::ZERO));
    assert!(shared.iter().all(|c| *c < Uint::from_u64(Q)));
}

#[test]
fn every_ciphertext_has_the_ring_shape() {
    let (_, mut encryptor) = setup();
    for m in 0..16u64 {
        let plain = BigPoly::from_u64s(&[m, 15 - m, m / 2, 0], 5).unwrap();
        let ciphertext = encryptor.encrypt(&plain).unwrap();
        assert!(ciphertext.has_shape(2, 4, 14));
        for index in 0..2 {
            assert_eq!(ciphertext.poly(index).len(), 4);
            assert!(ciphertext.poly(index).iter().all(|c| *c < Uint::from_u64(Q)));
        }
    }
}

#[test]
fn public_key_is_kept_unchanged() {
    let params = EncryptionParameters::<LIMBS>::builder()
        .degree(4)
        .coeff_modulus(&[Q])
        .plain_modulus(16)
        .build();
    let (_, public_key) = KeyGenerator::new(&params).unwrap().generate();
    let mut encryptor = Encryptor::new(&params, &public_key).unwrap();
    encryptor
        .encrypt(&BigPoly::from_u64s(&[9], 5).unwrap())
        .unwrap();
    assert_eq!(encryptor.public_key(), &public_key);
}

#[test]
fn construction_rejects_mismatched_public_key() {
    let (params, _) = setup();
    let other = EncryptionParameters::<LIMBS>::builder()
        .degree(8)
        .coeff_modulus(&[Q])
        .plain_modulus(16)
        .build();
    let (_, wrong_degree) = KeyGenerator::new(&other).unwrap().generate();
    let error = Encryptor::new(&params, &wrong_degree).unwrap_err();
    assert!(matches!(error, EncryptionError::ShapeMismatch { .. }));
    assert_eq!(error.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn public_key_assembled_from_polynomials_encrypts_identically() {
    let (params, _) = setup();
    let (_, generated) = KeyGenerator::new(&params).unwrap().generate();
    let polys: Vec<BigPoly<LIMBS>> = (0..2)
        .map(|i| BigPoly::from_coeffs(generated.poly(i).to_vec(), 14).unwrap())
        .collect();
    let assembled = PolyArray::from_polys(&polys).unwrap();
    assert_eq!(assembled, generated);

    let plain = BigPoly::from_u64s(&[4, 0, 9, 15], 5).unwrap();
    let mut first = Encryptor::new(&params, &generated).unwrap();
    let mut second = Encryptor::new(&params, &assembled).unwrap();
    let mut a = PolyArray::empty();
    let mut b = PolyArray::empty();
    first
        .encrypt_into_with_rng(&plain, &mut a, &mut ChaCha20Rng::seed_from_u64(5))
        .unwrap();
    second
        .encrypt_into_with_rng(&plain, &mut b, &mut ChaCha20Rng::seed_from_u64(5))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn public_key_borrowed_from_a_caller_buffer_is_accepted() {
    let (params, _) = setup();
    let (_, generated) = KeyGenerator::new(&params).unwrap().generate();
    let mut buffer: Vec<Uint<LIMBS>> = (0..2).flat_map(|i| generated.poly(i).to_vec()).collect();
    let borrowed = PolyArray::alias(&mut buffer, 2, 4, 14).unwrap();
    let encryptor = Encryptor::new(&params, &borrowed).unwrap();
    assert_eq!(encryptor.public_key(), &generated);
}
